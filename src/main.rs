use pumpwatch::logger::{self, LogTag};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    logger::init();

    if let Err(e) = pumpwatch::run::start().await {
        logger::error(LogTag::System, &format!("Fatal: {}", e));
        logger::flush();
        std::process::exit(1);
    }

    logger::flush();
}
