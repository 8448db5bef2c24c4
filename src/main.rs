use keymove::RenameError;

mod app;
mod logging;

fn main() {
    let args = keymove::cli::parse();
    if let Err(e) = app::run(args) {
        let code = e.downcast_ref::<RenameError>().map(RenameError::code).unwrap_or(1);
        keymove::output::print_error(&format!("{e:#}"));
        std::process::exit(code);
    }
}
