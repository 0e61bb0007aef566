#[tokio::main]
async fn main() {
    rsvp::start_server().await;
}
