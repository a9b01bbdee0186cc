use flatlayout::cli::{self, Cli};
use flatlayout::ui::output;

fn main() {
    let cli = Cli::parse_args();
    cli::init_logging(cli.debug, cli.quiet);

    if let Err(e) = cli::run(cli) {
        output::error(format!("{:#}", e));
        std::process::exit(1);
    }
}
