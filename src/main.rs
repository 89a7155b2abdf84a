//! `snapwire` binary: listen for camera frames or emulate a camera.

mod cli;

use std::{
    error::Error,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
    time::Duration,
};

use clap::Parser;
use cli::{Cli, Command, ListenArgs, SendArgs};
use log::info;
use snapwire::{
    fragmenter::Fragmenter,
    receiver::{Receiver, ReceiverConfig, bind_socket},
    sink::{FrameLog, JpegInspector, LastFrameWriter, SinkChain},
};
use tokio::{net::UdpSocket, time::sleep};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Listen(args) => listen(args).await,
        Command::Send(args) => send(args).await,
    }
}

async fn listen(args: ListenArgs) -> Result<(), Box<dyn Error>> {
    let config = ReceiverConfig::default()
        .bind_addr(SocketAddr::new(args.bind, args.port))
        .recv_buffer_size(args.recv_buffer)
        .poll_timeout(Duration::from_millis(args.timeout_ms))
        .max_frame_size(args.max_frame_size);
    install_metrics(args.metrics_addr)?;

    let mut sink = SinkChain::new().with(JpegInspector);
    if !args.no_save {
        sink.push(LastFrameWriter::new(args.save));
    }
    sink.push(FrameLog);

    let socket = bind_socket(&config)?;
    info!("listening UDP {}", socket.local_addr()?);
    let stats = Receiver::new(config, sink).run(socket).await?;
    info!(
        "stopping: {} datagrams, {} frames, {} abandoned, {} dropped, {} rejected",
        stats.datagrams,
        stats.frames_completed,
        stats.frames_abandoned,
        stats.datagrams_dropped,
        stats.sink_failures
    );
    Ok(())
}

async fn send(args: SendArgs) -> Result<(), Box<dyn Error>> {
    let frame = tokio::fs::read(&args.file).await?;
    let batch = Fragmenter::new(args.mtu)?.fragment(&frame)?;

    let local = if args.to.is_ipv4() {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
    } else {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
    };
    let socket = UdpSocket::bind(local).await?;
    let interval = Duration::from_millis(args.interval_ms);

    for round in 1..=args.repeat {
        if round > 1 {
            sleep(interval).await;
        }
        let Some((header, fragments)) = batch.datagrams().split_first() else {
            break;
        };
        socket.send_to(header, args.to).await?;
        if args.reverse {
            for datagram in fragments.iter().rev() {
                socket.send_to(datagram, args.to).await?;
            }
        } else {
            for datagram in fragments {
                socket.send_to(datagram, args.to).await?;
            }
        }
        info!(
            "[{round}/{}] sent {} bytes in {} datagrams to {}",
            args.repeat,
            batch.total_size(),
            batch.len(),
            args.to
        );
    }
    Ok(())
}

#[cfg(feature = "metrics")]
fn install_metrics(addr: Option<SocketAddr>) -> Result<(), Box<dyn Error>> {
    if let Some(addr) = addr {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!("serving metrics on http://{addr}/metrics");
    }
    Ok(())
}

#[cfg(not(feature = "metrics"))]
fn install_metrics(addr: Option<SocketAddr>) -> Result<(), Box<dyn Error>> {
    if addr.is_some() {
        log::warn!("--metrics-addr ignored: built without the metrics feature");
    }
    Ok(())
}
