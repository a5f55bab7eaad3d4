//! Demo client driving a microTCP endpoint over loopback, binding to
//! `127.0.0.1:2121` and connecting to `127.0.0.1:2122`.
//!
//! Not part of the library: the CLI harness and signal handling are kept
//! here only to exercise the library end to end over real sockets.

use std::net::SocketAddrV4;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use log::info;
use microtcp::{Config, Endpoint, ShutdownMode};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let local: SocketAddrV4 = SocketAddrV4::from_str("127.0.0.1:2121")?;
    let remote: SocketAddrV4 = SocketAddrV4::from_str("127.0.0.1:2122")?;

    let mut endpoint = Endpoint::new(Config::default())?;
    endpoint.bind(local)?;
    endpoint.connect(remote)?;
    info!("connected to {remote}");

    let endpoint = Arc::new(Mutex::new(endpoint));

    {
        let endpoint = endpoint.clone();
        ctrlc::set_handler(move || {
            if let Ok(mut endpoint) = endpoint.lock() {
                let _ = endpoint.shutdown(ShutdownMode::ReadWrite);
            }
            std::process::exit(0);
        })?;
    }

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        endpoint.lock().unwrap().send(line.as_bytes())?;
    }

    endpoint.lock().unwrap().shutdown(ShutdownMode::ReadWrite)?;
    Ok(())
}
