//! The fetch command: resolve settings, download, install, report.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::debug;
use url::Url;

use minilisp_assets::AssetFetcher;
use minilisp_assets::source::parse_http_url;
use minilisp_config::Config;

use crate::theme::Theme;

/// Flags that override the loaded configuration.
#[derive(Debug, Default, Args)]
pub(crate) struct FetchArgs {
    /// Release archive URL
    #[arg(long, value_name = "URL")]
    pub(crate) url: Option<String>,

    /// Directory receiving mini_lisp.wasm and mini_lisp.js (must exist;
    /// relative to the working directory)
    #[arg(short, long, value_name = "DIR")]
    pub(crate) dest: Option<PathBuf>,

    /// Download through the relay proxy
    #[arg(long, overrides_with = "no_proxy")]
    pub(crate) proxy: bool,

    /// Download directly even if USE_CF_PROXY is set
    #[arg(long, overrides_with = "proxy")]
    pub(crate) no_proxy: bool,

    /// Relay proxy endpoint; the archive URL is passed as `target`
    #[arg(long, value_name = "URL")]
    pub(crate) proxy_endpoint: Option<String>,

    /// Print the URL that would be requested and exit
    #[arg(long)]
    pub(crate) print_url: bool,
}

/// Fully resolved inputs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchPlan {
    pub(crate) source_url: Url,
    pub(crate) proxy_endpoint: Url,
    pub(crate) use_proxy: bool,
    pub(crate) destination: PathBuf,
}

impl FetchPlan {
    /// Apply command-line flags on top of `config`.
    pub(crate) fn resolve(args: &FetchArgs, config: &Config) -> anyhow::Result<Self> {
        let source_url = parse_http_url(args.url.as_deref().unwrap_or(&config.source.url))
            .context("invalid source URL")?;
        let proxy_endpoint = parse_http_url(
            args.proxy_endpoint
                .as_deref()
                .unwrap_or(&config.source.proxy_endpoint),
        )
        .context("invalid proxy endpoint")?;

        let use_proxy = if args.proxy {
            true
        } else if args.no_proxy {
            false
        } else {
            config.source.use_proxy
        };

        let destination = args
            .dest
            .clone()
            .unwrap_or_else(|| config.install.destination_path());

        Ok(Self {
            source_url,
            proxy_endpoint,
            use_proxy,
            destination,
        })
    }
}

pub(crate) async fn run_fetch(args: &FetchArgs, config: &Config) -> anyhow::Result<()> {
    let plan = FetchPlan::resolve(args, config)?;
    debug!(
        source = %plan.source_url,
        proxy = plan.use_proxy,
        proxy_endpoint = %plan.proxy_endpoint,
        destination = %plan.destination.display(),
        "resolved fetch plan"
    );
    let fetcher = AssetFetcher::from_config(config)
        .context("failed to initialize HTTP client")?
        .with_proxy_endpoint(plan.proxy_endpoint.clone());

    if args.print_url {
        let url = fetcher.effective_url(&plan.source_url, plan.use_proxy)?;
        println!("{url}");
        return Ok(());
    }

    println!(
        "{}",
        Theme::info(&format!("Fetching {}", plan.source_url))
    );
    if plan.use_proxy {
        println!(
            "{}",
            Theme::warning(&format!("  via proxy {}", plan.proxy_endpoint))
        );
    }

    let installed = fetcher
        .fetch_and_install(&plan.source_url, plan.use_proxy, &plan.destination)
        .await
        .with_context(|| {
            format!(
                "failed to install mini_lisp assets into {}",
                plan.destination.display()
            )
        })?;

    for file in &installed.files {
        println!(
            "{} {}",
            Theme::success(&file.path.display().to_string()),
            Theme::dimmed(&format!("({} bytes)", file.size))
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use minilisp_assets::FetchError;

    use super::*;

    fn config(env: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::load_with_env(None, &env).unwrap()
    }

    #[test]
    fn defaults_come_from_config() {
        let plan = FetchPlan::resolve(&FetchArgs::default(), &config(&[])).unwrap();
        assert_eq!(plan.source_url.as_str(), minilisp_config::DEFAULT_SOURCE_URL);
        assert_eq!(
            plan.proxy_endpoint.as_str(),
            minilisp_config::DEFAULT_PROXY_ENDPOINT
        );
        assert!(!plan.use_proxy);
        assert_eq!(
            plan.destination,
            minilisp_config::project_root().join(minilisp_config::DEFAULT_DESTINATION)
        );
    }

    #[test]
    fn default_destination_is_absolute() {
        let plan = FetchPlan::resolve(&FetchArgs::default(), &config(&[])).unwrap();
        assert!(plan.destination.is_absolute());
        assert!(plan.destination.ends_with("docs/.vuepress/public"));
    }

    #[test]
    fn relative_env_destination_resolves_against_project_root() {
        let plan = FetchPlan::resolve(
            &FetchArgs::default(),
            &config(&[("MINILISP_ASSETS_DEST", "site/public")]),
        )
        .unwrap();
        assert_eq!(
            plan.destination,
            minilisp_config::project_root().join("site/public")
        );
    }

    #[test]
    fn proxy_env_turns_proxy_on() {
        let plan =
            FetchPlan::resolve(&FetchArgs::default(), &config(&[("USE_CF_PROXY", "1")])).unwrap();
        assert!(plan.use_proxy);
    }

    #[test]
    fn no_proxy_flag_beats_env() {
        let args = FetchArgs {
            no_proxy: true,
            ..FetchArgs::default()
        };
        let plan = FetchPlan::resolve(&args, &config(&[("USE_CF_PROXY", "1")])).unwrap();
        assert!(!plan.use_proxy);
    }

    #[test]
    fn flags_override_config() {
        let args = FetchArgs {
            url: Some("https://mirror.example.org/mini_lisp_wasm.zip".to_owned()),
            dest: Some(PathBuf::from("site/public")),
            proxy: true,
            proxy_endpoint: Some("https://relay.example.net/proxy".to_owned()),
            ..FetchArgs::default()
        };
        let plan = FetchPlan::resolve(&args, &config(&[])).unwrap();
        assert_eq!(
            plan.source_url.as_str(),
            "https://mirror.example.org/mini_lisp_wasm.zip"
        );
        assert_eq!(plan.proxy_endpoint.as_str(), "https://relay.example.net/proxy");
        assert!(plan.use_proxy);
        assert_eq!(plan.destination, PathBuf::from("site/public"));
    }

    #[test]
    fn bad_url_flag_is_rejected() {
        let args = FetchArgs {
            url: Some("mini_lisp_wasm.zip".to_owned()),
            ..FetchArgs::default()
        };
        assert!(FetchPlan::resolve(&args, &config(&[])).is_err());
    }

    #[tokio::test]
    async fn print_url_does_not_touch_network_or_disk() {
        let dest = tempfile::tempdir().unwrap();
        let args = FetchArgs {
            // Nothing listens here; a real request would fail.
            url: Some("http://127.0.0.1:9/mini_lisp_wasm.zip".to_owned()),
            dest: Some(dest.path().to_path_buf()),
            proxy: true,
            print_url: true,
            ..FetchArgs::default()
        };

        run_fetch(&args, &config(&[])).await.unwrap();
        assert!(std::fs::read_dir(dest.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn network_failure_propagates_as_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let dest = tempfile::tempdir().unwrap();
        let args = FetchArgs {
            url: Some(format!("http://127.0.0.1:{port}/mini_lisp_wasm.zip")),
            dest: Some(dest.path().to_path_buf()),
            ..FetchArgs::default()
        };

        let err = run_fetch(&args, &config(&[])).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::NetworkFailure { .. })
        ));
        assert!(std::fs::read_dir(dest.path()).unwrap().next().is_none());
    }
}
