#[tokio::main]
async fn main() {
    transfer_backend::run().await;
}
