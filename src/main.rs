use paramspec::cli::CommandLineInterface;
use paramspec::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let command_line_interface = CommandLineInterface::load();
    init_logging(command_line_interface.verbose())?;
    command_line_interface.run()
}
