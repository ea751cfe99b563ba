use quechat_analytics::{CliError, exit_code};

fn is_robot_mode_args() -> bool {
    std::env::args().any(|arg| arg == "--json" || arg == "--robot")
}

fn report_and_exit(err: CliError, robot: bool) -> ! {
    if err.code == exit_code::SUCCESS {
        // --help / --version
        print!("{}", err.message);
    } else if robot {
        eprintln!("{}", err.to_json());
    } else {
        eprintln!("{}", err.message.trim_end());
        if let Some(hint) = &err.hint {
            eprintln!("hint: {hint}");
        }
    }
    std::process::exit(err.code);
}

fn main() {
    // Load .env early; ignore if missing.
    dotenvy::dotenv().ok();

    let raw_args: Vec<String> = std::env::args().collect();
    let parsed = match quechat_analytics::parse_cli(raw_args) {
        Ok(parsed) => parsed,
        Err(err) => report_and_exit(err, is_robot_mode_args()),
    };

    quechat_analytics::init_tracing(&parsed.cli.log_level);

    let robot = parsed.robot;
    if let Err(err) = quechat_analytics::run_with_parsed(parsed) {
        report_and_exit(err, robot);
    }
}
