use twilio_sms::{MessageSender, SenderConfig, logger};

const DEFAULT_BODY: &str = "hi";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    logger::setup_logger("info");

    let body = message_body(std::env::args().skip(1));

    let config = match SenderConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            return;
        }
    };

    let sender = match MessageSender::new(config) {
        Ok(sender) => sender,
        Err(err) => {
            tracing::error!(error = %err, "failed to set up client");
            return;
        }
    };

    sender.send_and_report(&body).await;
}

fn message_body(args: impl Iterator<Item = String>) -> String {
    let body = args.collect::<Vec<_>>().join(" ");
    if body.is_empty() {
        DEFAULT_BODY.to_owned()
    } else {
        body
    }
}
