#[tokio::main]
async fn main() {
    rental_backend::run().await;
}
