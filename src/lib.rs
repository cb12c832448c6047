// Library root
// -----------
// The binary (`main.rs`) wires these modules into a one-shot interactive
// backup: fetch a captioned cat picture, upload it to Yandex.Disk and
// record what happened in a local JSON file.
//
// Module responsibilities:
// - `config`: service endpoints, target folder, timeout and output dir.
// - `error`: the `BackupError` type shared by every step.
// - `api`: blocking HTTP calls to cataas.com and the Yandex.Disk REST API.
// - `record`: request/record types and the JSON metadata file.
// - `workflow`: the linear fetch -> folder -> upload -> record sequence.
// - `ui`: terminal prompts and progress output.
pub mod api;
pub mod config;
pub mod error;
pub mod record;
pub mod ui;
pub mod workflow;
