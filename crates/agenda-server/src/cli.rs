use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "agenda-server", about = "Event status and weekly instance service")]
pub struct Args {
    /// Path to the TOML config file. A missing file means built-in defaults.
    #[arg(short, long, default_value = "agenda.toml")]
    pub config: String,

    /// Override `server.bind_address`.
    #[arg(long)]
    pub bind: Option<String>,

    /// Override `database.url`.
    #[arg(long)]
    pub database_url: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,
}
