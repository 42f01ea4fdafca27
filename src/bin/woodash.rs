use clap::{Parser, Subcommand};

use woodash::{
    format_change, top_products, Bucket, ComparisonMode, Dashboard, Granularity,
    MetricsWithChanges, Order, OrderSource, Period, ProductSales, RefreshOptions, StoreClient,
};

#[derive(Parser)]
#[command(name = "woodash", about = "WooCommerce store analytics CLI")]
struct Cli {
    /// Store API base URL, e.g. https://store.example.com/wp-json/wc/v3
    /// (default: $WOODASH_URL)
    #[arg(long)]
    url: Option<String>,

    /// API consumer key (default: $WOODASH_KEY)
    #[arg(long)]
    key: Option<String>,

    /// API consumer secret (default: $WOODASH_SECRET)
    #[arg(long)]
    secret: Option<String>,

    /// Page size for orders requests (default: 100)
    #[arg(long)]
    page_size: Option<u32>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full dashboard: metrics, revenue series, top products, orders
    Snapshot {
        /// Period token: today, yesterday, mtd, ytd, last-month, last-30, last-7
        #[arg(long, default_value = "mtd")]
        period: String,
        /// Comparison mode: last-period or last-year
        #[arg(long)]
        compare: Option<String>,
        /// Chart bucketing: daily, weekly, monthly
        #[arg(long, default_value = "daily")]
        granularity: String,
        /// Maximum top products to include
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Summary metrics for a period
    Metrics {
        #[arg(long, default_value = "mtd")]
        period: String,
        /// Comparison mode: last-period or last-year
        #[arg(long)]
        compare: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List orders in a period
    Orders {
        #[arg(long, default_value = "mtd")]
        period: String,
        #[arg(long)]
        json: bool,
    },
    /// Top products by revenue in a period
    Products {
        #[arg(long, default_value = "mtd")]
        period: String,
        #[arg(long, default_value = "10")]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// List catalog products by popularity
    Catalog {
        #[arg(long, default_value = "10")]
        limit: u32,
        #[arg(long)]
        json: bool,
    },
    /// Check connectivity to the store
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let client = make_client(&cli)?;

    match &cli.command {
        Commands::Snapshot {
            period,
            compare,
            granularity,
            limit,
            json,
        } => {
            let options = RefreshOptions {
                period: Period::from_token(period),
                comparison: parse_compare(compare.as_deref())?,
                granularity: Granularity::from_token(granularity),
                top_limit: *limit,
            };
            let dash = Dashboard::new(client);
            let snapshot = dash.refresh(&options).await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("Dashboard: {} ({})", snapshot.period, snapshot.range);
                if let Some(ref cmp) = snapshot.comparison_range {
                    println!("Compared to: {cmp}");
                }
                print_metrics(&snapshot.metrics, snapshot.comparison_range.is_some());
                print_series(&snapshot.revenue_series);
                print_top_products(&snapshot.top_products);
                print_orders(&snapshot.orders);
            }
        }
        Commands::Metrics {
            period,
            compare,
            json,
        } => {
            let options = RefreshOptions {
                period: Period::from_token(period),
                comparison: parse_compare(compare.as_deref())?,
                granularity: Granularity::Daily,
                top_limit: 0,
            };
            let dash = Dashboard::new(client);
            let snapshot = dash.refresh(&options).await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&snapshot.metrics)?);
            } else {
                println!("Metrics: {} ({})", snapshot.period, snapshot.range);
                print_metrics(&snapshot.metrics, snapshot.comparison_range.is_some());
            }
        }
        Commands::Orders { period, json } => {
            let range = Period::from_token(period).resolve();
            let orders = client.orders_in_range(&range).await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&orders)?);
            } else {
                println!("Orders: {range}");
                print_orders(&orders);
            }
        }
        Commands::Products {
            period,
            limit,
            json,
        } => {
            let range = Period::from_token(period).resolve();
            let orders = client.orders_in_range(&range).await?;
            let ranked = top_products(&orders, *limit);
            if *json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else {
                println!("Top products: {range}");
                print_top_products(&ranked);
            }
        }
        Commands::Catalog { limit, json } => {
            let products = client.products(*limit).await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&products)?);
            } else if products.is_empty() {
                println!("No products found.");
            } else {
                for p in &products {
                    println!("{} ({}) - {} sold", p.name, p.id, p.total_sales);
                }
            }
        }
        Commands::Status => {
            let url = client.base_url().to_string();
            match client.ping().await {
                Ok(()) => {
                    println!("Store:      {url}");
                    println!("Connection: OK");
                }
                Err(e) => {
                    println!("Store:      {url}");
                    println!("Connection: FAILED ({e})");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn make_client(cli: &Cli) -> anyhow::Result<StoreClient> {
    let url = cli
        .url
        .clone()
        .or_else(|| std::env::var("WOODASH_URL").ok())
        .ok_or_else(|| anyhow::anyhow!("Store URL not set. Pass --url or set WOODASH_URL."))?;
    let key = cli
        .key
        .clone()
        .or_else(|| std::env::var("WOODASH_KEY").ok())
        .ok_or_else(|| anyhow::anyhow!("Consumer key not set. Pass --key or set WOODASH_KEY."))?;
    let secret = cli
        .secret
        .clone()
        .or_else(|| std::env::var("WOODASH_SECRET").ok())
        .ok_or_else(|| {
            anyhow::anyhow!("Consumer secret not set. Pass --secret or set WOODASH_SECRET.")
        })?;

    let mut client = StoreClient::new(&url, key, secret)?;
    if let Some(ps) = cli.page_size {
        client = client.with_page_size(ps);
    }
    Ok(client)
}

fn parse_compare(compare: Option<&str>) -> anyhow::Result<Option<ComparisonMode>> {
    match compare {
        None => Ok(None),
        Some(s) => match ComparisonMode::from_token(s) {
            Some(mode) => Ok(Some(mode)),
            None => anyhow::bail!("Unknown comparison mode: {s}. Use: last-period, last-year"),
        },
    }
}

fn print_metrics(m: &MetricsWithChanges, with_changes: bool) {
    let suffix = |change: f64| {
        if with_changes {
            format!("  ({})", format_change(change))
        } else {
            String::new()
        }
    };
    println!("  Revenue:     {}{}", format_currency(m.metrics.total_revenue), suffix(m.changes.revenue_change));
    println!("  Orders:      {}{}", m.metrics.total_orders, suffix(m.changes.orders_change));
    println!("  Customers:   {}{}", m.metrics.total_customers, suffix(m.changes.customers_change));
    println!("  Avg order:   {}{}", format_currency(m.metrics.avg_order_value), suffix(m.changes.aov_change));
}

fn print_series(series: &[Bucket]) {
    println!("  Revenue series:");
    if series.is_empty() {
        println!("    No orders in period.");
        return;
    }
    for b in series {
        println!(
            "    {}  {:>12}  ({} orders)",
            b.date,
            format_currency(b.total),
            b.order_count
        );
    }
}

fn print_top_products(products: &[ProductSales]) {
    println!("  Top products:");
    if products.is_empty() {
        println!("    No product sales in period.");
        return;
    }
    for (i, p) in products.iter().enumerate() {
        println!(
            "    {}. {} ({}) - {} sold, {}",
            i + 1,
            p.name,
            p.product_id,
            p.quantity,
            format_currency(p.revenue)
        );
    }
}

fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("  No orders in period.");
        return;
    }
    for order in orders {
        println!(
            "  #{} {} | {} | {} | {}",
            order.number,
            order.customer_name(),
            order.date_created.date(),
            format_status(&order.status),
            format_currency(woodash::model::parse_amount(&order.total))
        );
    }
    println!("\n  {} orders", orders.len());
}

fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${amount:.2}")
    }
}

/// "on-hold" -> "On Hold", matching how the dashboard renders statuses.
fn format_status(status: &str) -> String {
    status
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
