use billing_server::auth::permissions::get_default_permissions;
use billing_server::{Config, JwtService, Server, ServerState, setup_environment};

/// `billing-server issue-token <username> <role>` prints a bearer token
/// for operators and scripts; anything else starts the server.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. .env, configuration, logging
    dotenv::dotenv().ok();
    let config = Config::from_env()?;
    setup_environment(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [command, username, role] = args.as_slice()
        && command == "issue-token"
    {
        let jwt = JwtService::with_config(config.jwt.clone());
        let token = jwt.generate_token(username, username, role, &get_default_permissions(role))?;
        println!("{token}");
        return Ok(());
    }

    tracing::info!("Billing server starting...");

    // 2. Open the store and build services
    let state = ServerState::initialize(&config).await?;

    // 3. Serve until Ctrl+C
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
