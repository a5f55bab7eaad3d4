//! Demo server driving a microTCP endpoint over loopback, binding to and
//! accepting on `127.0.0.1:2122`.

use std::net::SocketAddrV4;
use std::str::FromStr;

use log::info;
use microtcp::{Config, Endpoint, RecvOutcome};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let local: SocketAddrV4 = SocketAddrV4::from_str("127.0.0.1:2122")?;

    let mut endpoint = Endpoint::new(Config::default())?;
    endpoint.bind(local)?;

    info!("listening on {local}");
    let peer = endpoint.accept()?;
    info!("accepted connection from {peer}");

    let mut buf = vec![0u8; 4096];
    loop {
        match endpoint.recv(&mut buf, false)? {
            RecvOutcome::Data(n) => {
                println!("{}", String::from_utf8_lossy(&buf[..n]));
            }
            RecvOutcome::PeerClosed => {
                info!("peer closed the connection");
                break;
            }
        }
    }

    Ok(())
}
