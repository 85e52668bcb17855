use std::process;

use env_logger;

use log::{debug, error};

use mdarchive::explorer::Explorer;
use mdarchive::ledger::JsonlLedger;
use mdarchive::orchestrate::{
    Orchestrator,
    Status,
};
use mdarchive::attempt::Outcome;
use mdarchive::upload::Credentials;
use mdarchive::upload::http::HttpUploader;

mod arg;

use arg::Settings;

const EXIT_FAILED: i32 = 1;
const EXIT_LEDGER: i32 = 2;

fn main() {
    env_logger::init();

    let settings = match Settings::from_args() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(EXIT_FAILED);
        },
    };
    let explorer = match Explorer::new(&settings.explorer) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(EXIT_FAILED);
        },
    };
    debug!("gateway {} ledger {:?}", settings.gateway, settings.ledger);

    let uploader = HttpUploader::new(settings.gateway.clone());
    let ledger = JsonlLedger::new(&settings.ledger);
    let o = Orchestrator::new(uploader, ledger, Credentials::new(settings.token.as_str()))
        .with_explorer(explorer)
        .with_content_type(&settings.content_type);

    let report = o.run(&settings.file, settings.author.as_deref());

    if let Some(v) = report.attempt.content_id() {
        println!("content id: {}", v);
    }
    if let Outcome::Succeeded{ remote_id, url } = report.attempt.outcome() {
        println!("remote id:  {}", remote_id);
        println!("url:        {}", url);
    }
    if let Some(e) = &report.ledger_error {
        if report.attempt.outcome().is_success() {
            eprintln!("warning: content is stored but the local record was not written: {}", e);
        } else {
            eprintln!("warning: local record was not written: {}", e);
        }
    }

    match report.status() {
        Status::Succeeded => {},
        Status::SucceededWithLedgerWriteError => {
            process::exit(EXIT_LEDGER);
        },
        Status::Failed(failure) => {
            error!("archive of {:?} failed", settings.file);
            eprintln!("{}", failure);
            process::exit(EXIT_FAILED);
        },
    }
}
