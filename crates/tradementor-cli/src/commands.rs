//! Command execution. Each command restores the session first, the way the
//! app does on launch, then makes its calls through the session's gateway.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use tracing::warn;

use tradementor_core::models::{
    IpoApplication, NewsQuery, OrderRequest, OrderSide, Page, StopLossRequest, StopLossUpdate,
};
use tradementor_core::{ApiError, Config, Session, SessionManager};

use crate::cli::{
    AiCommand, Command, IpoCommand, LearnCommand, NewsCommand, PageArgs, PortfolioCommand,
    ProfileCommand, StocksCommand, StopLossCommand, TradeCommand,
};

pub async fn run(command: Command, session: &SessionManager, config: &mut Config) -> Result<()> {
    let restored = session.restore().await;

    match command {
        Command::Status => print_status(&restored),
        Command::Health => print_json(&session.api().health_check().await?),
        Command::SignIn { email } => sign_in(session, config, email).await,
        Command::SignUp { name, email } => {
            let password = prompt_password()?;
            let profile = session.sign_up(&name, &email, &password).await?;
            remember_email(config, &email);
            print_json(&profile)
        }
        Command::SignOut => {
            session.sign_out()?;
            eprintln!("Signed out");
            Ok(())
        }
        Command::Profile(cmd) => profile(session, cmd).await,
        Command::Dashboard => dashboard(session).await,
        other => {
            if !restored.is_authenticated() {
                warn!("Not signed in; the backend will likely reject this request");
            }
            let value = data_command(session, other).await?;
            print_json(&value)
        }
    }
}

fn print_status(session: &Session) -> Result<()> {
    println!("Session: {}", session.label());
    if let Some(profile) = session.profile() {
        print_json(profile)?;
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_json_arg(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("Argument is not valid JSON: {}", raw))
}

fn prompt_email(default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("Email [{}]: ", d),
        None => print!("Email: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    match (input.is_empty(), default) {
        (false, _) => Ok(input.to_string()),
        (true, Some(d)) => Ok(d.to_string()),
        (true, None) => bail!("Email is required"),
    }
}

fn prompt_password() -> Result<String> {
    rpassword::prompt_password("Password: ").context("Failed to read password")
}

fn remember_email(config: &mut Config, email: &str) {
    config.last_email = Some(email.to_string());
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
}

async fn sign_in(session: &SessionManager, config: &mut Config, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_email(config.last_email.as_deref())?,
    };
    let password = prompt_password()?;

    let profile = session.sign_in(&email, &password).await?;
    remember_email(config, &email);
    print_json(&profile)
}

async fn profile(session: &SessionManager, cmd: ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::Show => match session.profile() {
            Some(profile) => print_json(&profile),
            None => bail!("Not signed in"),
        },
        ProfileCommand::Update { json } => {
            let payload = parse_json_arg(&json)?;
            session.api().update_profile(&payload).await?;
            print_json(&session.refresh_profile().await?)
        }
    }
}

/// Fetch the home screen's three panels concurrently. A failing panel shows
/// its error instead of failing the whole command.
async fn dashboard(session: &SessionManager) -> Result<()> {
    let api = session.api();
    let (overview, summary, watchlist) = futures::join!(
        api.get_market_overview(),
        api.get_portfolio_summary(),
        api.get_watchlist(),
    );

    let panel = |result: Result<Value, ApiError>| match result {
        Ok(value) => value,
        Err(e) => json!({ "error": e.message(), "status": e.status() }),
    };

    print_json(&json!({
        "marketOverview": panel(overview),
        "portfolioSummary": panel(summary),
        "watchlist": panel(watchlist),
    }))
}

fn page(args: PageArgs) -> Page {
    Page::new(args.page, args.limit)
}

async fn data_command(session: &SessionManager, command: Command) -> Result<Value> {
    let api = session.api();

    let value = match command {
        Command::Stocks(cmd) => match cmd {
            StocksCommand::Overview => api.get_market_overview().await?,
            StocksCommand::Watchlist => api.get_watchlist().await?,
            StocksCommand::Watch { symbol } => api.add_to_watchlist(&symbol).await?,
            StocksCommand::Unwatch { symbol } => api.remove_from_watchlist(&symbol).await?,
            StocksCommand::Quote { symbol } => api.get_stock_data(&symbol).await?,
            StocksCommand::History { symbol } => api.get_stock_history(&symbol).await?,
            StocksCommand::Search { query } => api.search_stocks(&query).await?,
            StocksCommand::Sector { sector } => api.get_sector_stocks(&sector).await?,
            StocksCommand::Company { symbol } => api.get_company_info(&symbol).await?,
        },
        Command::Portfolio(cmd) => match cmd {
            PortfolioCommand::Summary => api.get_portfolio_summary().await?,
            PortfolioCommand::Holdings => api.get_portfolio_holdings().await?,
            PortfolioCommand::Transactions(args) => {
                api.get_portfolio_transactions(page(args)).await?
            }
            PortfolioCommand::Performance => api.get_portfolio_performance().await?,
        },
        Command::News(cmd) => match cmd {
            NewsCommand::List { page, limit, query } => {
                api.get_news(&NewsQuery { page, limit, query }).await?
            }
            NewsCommand::Show { id } => api.get_news_by_id(&id).await?,
            NewsCommand::Refresh { secret, json } => {
                api.refresh_news_admin(&secret, &parse_json_arg(&json)?)
                    .await?
            }
        },
        Command::Ipo(cmd) => match cmd {
            IpoCommand::List => api.get_all_ipos().await?,
            IpoCommand::Show { id } => api.get_ipo_by_id(&id).await?,
            IpoCommand::Symbol { symbol } => api.get_ipo_by_symbol(&symbol).await?,
            IpoCommand::Apply { id, lots } => {
                let user_id = session
                    .profile()
                    .as_ref()
                    .and_then(user_id)
                    .context("IPO applications need a signed-in user")?;
                let application = IpoApplication {
                    user_id,
                    applied_lots: lots,
                };
                api.apply_for_ipo(&id, &application).await?
            }
            IpoCommand::Applications { id } => api.get_ipo_applications(&id).await?,
            IpoCommand::Allotment { id } => api.get_ipo_allotment(&id).await?,
        },
        Command::Learn(cmd) => match cmd {
            LearnCommand::Chat { message } => api.chat_with_ai(&message).await?,
            LearnCommand::Content { level } => api.get_learn_content(&level).await?,
            LearnCommand::Search { query, level } => {
                api.search_learn_content(&level, &query).await?
            }
            LearnCommand::Reset => api.reset_learn_chat().await?,
        },
        Command::Trade(cmd) => match cmd {
            TradeCommand::Place {
                symbol,
                side,
                qty,
                price,
            } => {
                let side: OrderSide = side.parse().map_err(anyhow::Error::msg)?;
                let order = OrderRequest {
                    symbol,
                    side,
                    qty,
                    price,
                };
                api.place_order(&order).await?
            }
            TradeCommand::History(args) => api.get_trading_history(page(args)).await?,
        },
        Command::StopLoss(cmd) => match cmd {
            StopLossCommand::List => api.get_stop_loss_orders().await?,
            StopLossCommand::Create {
                symbol,
                price,
                quantity,
            } => {
                let request = StopLossRequest {
                    symbol,
                    stop_loss_price: price,
                    quantity,
                };
                api.create_stop_loss(&request).await?
            }
            StopLossCommand::Update {
                id,
                price,
                quantity,
            } => {
                let update = StopLossUpdate {
                    stop_loss_price: price,
                    quantity,
                };
                api.update_stop_loss(&id, &update).await?
            }
            StopLossCommand::Delete { id } => api.delete_stop_loss(&id).await?,
        },
        Command::Ai(cmd) => match cmd {
            AiCommand::Analyze => api.analyze_portfolio().await?,
            AiCommand::Recommend { json } => api.get_ai_recommendations(parse_json_arg(&json)?).await?,
            AiCommand::Insights { symbols } => {
                let symbols: Vec<&str> = symbols.iter().map(String::as_str).collect();
                api.get_market_insights(&symbols).await?
            }
        },
        other => bail!("Unhandled command: {:?}", other),
    };

    Ok(value)
}

/// The backend's user records carry either `_id` or `id`
fn user_id(profile: &Value) -> Option<String> {
    ["_id", "id"]
        .iter()
        .filter_map(|key| profile.get(*key))
        .find_map(|id| match id {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}
