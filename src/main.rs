fn main() {
    match handle_cli_flags() {
        Ok(true) => return,
        Ok(false) => {}
        Err(err) => {
            eprintln!("error: {err:?}");
            std::process::exit(1);
        }
    }

    if let Err(err) = goshorts::run() {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn handle_cli_flags() -> anyhow::Result<bool> {
    let mut saw_flag = false;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("GoShorts {}", goshorts::VERSION);
                saw_flag = true;
            }
            "--help" | "-h" => {
                println!(
                    "GoShorts: short videos in your terminal.\n\n  --version, -V            Show version and exit\n  --help,    -h            Show this help message\n  --print-user-id          Print the local user id and exit\n  --set-endpoint <URL>     Save the sync endpoint to the config file and exit"
                );
                saw_flag = true;
            }
            "--print-user-id" => {
                saw_flag = true;
                print_user_id()?;
            }
            "--set-endpoint" => {
                saw_flag = true;
                let endpoint = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--set-endpoint needs a URL"))?;
                let path = goshorts::config::save_sync_endpoint(None, &endpoint)?;
                println!("Sync endpoint saved to {}", path.display());
            }
            _ => {}
        }
    }
    Ok(saw_flag)
}

fn print_user_id() -> anyhow::Result<()> {
    use anyhow::Context;

    let store = goshorts::storage::Store::open(goshorts::storage::Options::default())
        .context("open storage")?;
    let identity = store.identity().context("load user id")?;
    println!("{}", identity.user_id);
    store.close()
}
