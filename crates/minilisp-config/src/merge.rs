/// Deep-merge `overlay` into `base`. Tables merge recursively; any other
/// value in `overlay` replaces the one in `base`.
pub fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}

/// Set a value at a dotted path, creating intermediate tables as needed.
/// Non-table intermediates are replaced.
pub fn set_nested(root: &mut toml::Value, path: &[&str], value: toml::Value) {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for key in parents {
        if !current.is_table() {
            *current = toml::Value::Table(toml::value::Table::new());
        }
        let toml::Value::Table(table) = current else {
            return;
        };
        current = table
            .entry((*key).to_owned())
            .or_insert(toml::Value::Table(toml::value::Table::new()));
    }

    if !current.is_table() {
        *current = toml::Value::Table(toml::value::Table::new());
    }
    if let toml::Value::Table(table) = current {
        table.insert((*last).to_owned(), value);
    }
}
