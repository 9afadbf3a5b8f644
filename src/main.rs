use std::env;

use student_loan::core::LoanCalculator;

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() {
    env_logger::init();

    let raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .cloned()
                .or_else(|| env::var("PORT").ok())
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT);
            if let Err(e) = student_loan::api::run_http_server(port, LoanCalculator::default()).await
            {
                log::error!("server error: {e}");
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Some("calculate") => match student_loan::api::run_cli(&raw_args[1..]) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        _ => {
            eprintln!("Usage: student-loan serve [port]");
            eprintln!("       student-loan calculate --plan <id> --balance <n> --salary <n> ...");
            std::process::exit(1);
        }
    }
}
