use std::path::PathBuf;

use clap::{
    App,
    Arg,
    ArgMatches,
};
use thiserror::Error;
use url::Url;

use mdarchive::explorer::DEFAULT_EXPLORER;
use mdarchive::ledger::file::DEFAULT_LEDGER;
use mdarchive::tag::DEFAULT_CONTENT_TYPE;

const GATEWAY: &str = "http://localhost:1984/tx";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid gateway url {0}: {1}")]
    Gateway(String, url::ParseError),
}

pub struct Settings {
    pub file: PathBuf,
    pub author: Option<String>,
    pub content_type: String,
    pub ledger: PathBuf,
    pub gateway: Url,
    pub token: String,
    pub explorer: String,
}

impl Settings {

    fn from_matches(arg: &ArgMatches) -> Result<Settings, SettingsError> {
        let gateway_src = arg.value_of("gateway").unwrap_or(GATEWAY);
        let gateway = match Url::parse(gateway_src) {
            Ok(v) => v,
            Err(e) => {
                return Err(SettingsError::Gateway(gateway_src.to_string(), e));
            },
        };

        Ok(Settings {
            file: PathBuf::from(arg.value_of("FILE").unwrap_or_default()),
            author: arg.value_of("author").map(|v| v.to_string()),
            content_type: arg.value_of("content_type").unwrap_or(DEFAULT_CONTENT_TYPE).to_string(),
            ledger: PathBuf::from(arg.value_of("ledger").unwrap_or(DEFAULT_LEDGER)),
            gateway,
            token: arg.value_of("token").unwrap_or_default().to_string(),
            explorer: arg.value_of("explorer").unwrap_or(DEFAULT_EXPLORER).to_string(),
        })
    }

    pub fn from_args() -> Result<Settings, SettingsError> {
        let mut o = App::new("mdarchive");
        o = o.version(env!("CARGO_PKG_VERSION"));
        o = o.about("Archive a markdown file to permanent storage and record the upload locally");
        o = o.arg(
            Arg::with_name("FILE")
                .required(true)
                .help("Markdown file to archive")
                );
        o = o.arg(
            Arg::with_name("author")
                .long("author")
                .short("a")
                .value_name("NAME")
                .help("Author tag value")
                .takes_value(true)
                );
        o = o.arg(
            Arg::with_name("content_type")
                .long("content-type")
                .short("t")
                .value_name("MIME")
                .help("Declared media type of the file")
                .takes_value(true)
                );
        o = o.arg(
            Arg::with_name("ledger")
                .long("ledger")
                .short("l")
                .value_name("PATH")
                .help("Local transaction ledger file")
                .takes_value(true)
                );
        o = o.arg(
            Arg::with_name("gateway")
                .long("gateway")
                .short("g")
                .value_name("URL")
                .help("Storage gateway upload endpoint")
                .takes_value(true)
                );
        o = o.arg(
            Arg::with_name("token")
                .long("token")
                .short("k")
                .value_name("TOKEN")
                .help("Credential passed to the gateway")
                .takes_value(true)
                );
        o = o.arg(
            Arg::with_name("explorer")
                .long("explorer")
                .short("e")
                .value_name("URL")
                .help("Base URL of the viewer used for links")
                .takes_value(true)
                );

        let arg_matches = o.get_matches();
        Settings::from_matches(&arg_matches)
    }
}
