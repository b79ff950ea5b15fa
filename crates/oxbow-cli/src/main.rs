use std::{env, fs, io, process::ExitCode};

use oxbow::{AnalysisSession, StdReport};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: oxbow <file.py> <mode>  (mode 0 = interactive query, 1 = transform)");
        return ExitCode::FAILURE;
    }
    let file_path = &args[1];
    let mode = &args[2];

    let code = match read_file(file_path) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut session = match AnalysisSession::new(&code) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = match mode.as_str() {
        "0" => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            session.interactive(&mut input, &mut StdReport)
        }
        "1" => session.transform(&mut StdReport),
        other => {
            eprintln!("error: unknown mode {other} (expected 0 or 1)");
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn read_file(file_path: &str) -> Result<String, String> {
    match fs::metadata(file_path) {
        Ok(metadata) => {
            if !metadata.is_file() {
                return Err(format!("{file_path} is not a file"));
            }
        }
        Err(err) => {
            return Err(format!("cannot read {file_path}: {err}"));
        }
    }
    fs::read_to_string(file_path).map_err(|err| format!("cannot read {file_path}: {err}"))
}
