// main.rs
use std::process;
use webp_to_jpg_coder::app;
use webp_to_jpg_coder::utils::Logger;

fn main() {
    let logger = Logger::default();
    if let Err(e) = app::run(&logger) {
        logger.log(format!("Aborted: {}", e));
        process::exit(1);
    }
}
