//! Basic example demonstrating the ETF2L API client.
//!
//! Run with:
//! ```
//! RUST_LOG=etf2l=debug cargo run --example basic
//! ```

use etf2l::{
    matches_page, Ban, BanQuery, CancellationToken, Etf2lClient, Get, List, Player, PlayerQuery,
    PlayerTransfer, Team,
};

#[tokio::main]
async fn main() -> etf2l::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    println!("Creating ETF2L client...");
    let client = Etf2lClient::from_env()?;
    let cancel = CancellationToken::new();
    println!("Connected to: {}", client.base_url());

    // Look up a player by SteamID64
    println!("\n--- Player ---");
    let player = Player::get(&client, &cancel, "76561197970669109".to_string()).await?;
    println!("Player: {} (#{})", player.name, player.id);
    println!("  Country: {}", player.country.as_deref().unwrap_or("unknown"));

    // Their transfer history, every page
    let query = PlayerQuery::new(player.id.to_string()).recursive(true);
    let transfers = PlayerTransfer::list(&client, &cancel, &query).await?;
    println!("  Transfers: {}", transfers.len());
    for transfer in transfers.iter().take(5) {
        println!("    {} {} ({})", transfer.transfer_type, transfer.team.name, transfer.time);
    }

    // First team on the player's profile
    if let Some(first) = player.teams.as_ref().and_then(|t| t.first()) {
        println!("\n--- Team ---");
        let team = Team::get(&client, &cancel, first.id).await?;
        println!("Team: {} [{}]", team.name, team.tag.as_deref().unwrap_or(""));
        for member in team.players_with_role("Leader") {
            println!("  Leader: {}", member.name);
        }
    }

    // First page of the ban list
    println!("\n--- Bans (first page) ---");
    let bans = Ban::list_page(&client, &cancel, &BanQuery::default()).await?;
    println!(
        "Page {}/{} ({} total bans)",
        bans.page, bans.last_page, bans.total
    );
    for ban in &bans {
        println!("  - {} ({})", ban.name, ban.reason);
    }

    // One large page of matches
    println!("\n--- Matches ---");
    let matches = matches_page(&client, &cancel, 1, 100).await?;
    println!("Fetched {} of {} matches", matches.len(), matches.total);

    Ok(())
}
