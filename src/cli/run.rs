use crate::{config::Config, controller::RunController, error, handler};

pub async fn run(config: Config) {
    let controller = match RunController::from_config(config).await {
        Ok(controller) => controller,
        Err(e) => error!("Cannot prepare run: {}", e),
    };

    let response = handler::invoke(&controller).await;
    println!("{}", response.to_json());

    if !response.is_success() {
        std::process::exit(1);
    }
}
