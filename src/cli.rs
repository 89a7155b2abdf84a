//! Command line interface for the `snapwire` binary.
//!
//! Shared with the build script, which renders the man page from these
//! definitions, so this module depends on nothing but `clap` and `std`.

use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroUsize,
    path::PathBuf,
};

use clap::{Args, Parser, Subcommand};

/// Command line arguments for the `snapwire` binary.
#[derive(Debug, Parser)]
#[command(
    name = "snapwire",
    version,
    about = "Reassemble JPEG frames streamed over UDP by camera devices"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Receive datagrams and reassemble frames until interrupted.
    Listen(ListenArgs),
    /// Fragment a file and stream it like a camera would.
    Send(SendArgs),
}

#[derive(Debug, Args)]
pub struct ListenArgs {
    /// Local address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: IpAddr,
    /// UDP port the camera streams to.
    #[arg(short, long, default_value_t = 3333)]
    pub port: u16,
    /// Requested kernel receive buffer in bytes.
    #[arg(long, default_value_t = 4 * 1024 * 1024)]
    pub recv_buffer: usize,
    /// Receive poll interval in milliseconds.
    #[arg(long, default_value_t = 500)]
    pub timeout_ms: u64,
    /// Path overwritten with every completed frame.
    #[arg(long, default_value = "/tmp/last_frame.jpg")]
    pub save: PathBuf,
    /// Do not write frames to disk.
    #[arg(long, conflicts_with = "save")]
    pub no_save: bool,
    /// Largest frame a header may declare, in bytes.
    #[arg(long, default_value = "16777216")]
    pub max_frame_size: NonZeroUsize,
    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Receiver address.
    #[arg(long)]
    pub to: SocketAddr,
    /// Frame to send, usually a JPEG image.
    #[arg(short, long)]
    pub file: PathBuf,
    /// Largest datagram to emit, in bytes.
    #[arg(long, default_value = "1400")]
    pub mtu: NonZeroUsize,
    /// Number of times to send the frame.
    #[arg(long, default_value_t = 1)]
    pub repeat: u32,
    /// Pause between repeats in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub interval_ms: u64,
    /// Send fragments after the header in reverse order.
    #[arg(long)]
    pub reverse: bool,
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rstest::rstest;

    use super::{Cli, Command};

    #[test]
    fn listen_defaults_match_camera_deployment() {
        let cli = Cli::parse_from(["snapwire", "listen"]);
        let Command::Listen(args) = cli.command else {
            panic!("expected listen subcommand");
        };
        assert_eq!(args.bind.to_string(), "0.0.0.0");
        assert_eq!(args.port, 3333);
        assert_eq!(args.recv_buffer, 4 * 1024 * 1024);
        assert_eq!(args.timeout_ms, 500);
        assert_eq!(args.save.to_str(), Some("/tmp/last_frame.jpg"));
        assert!(!args.no_save);
        assert_eq!(args.max_frame_size.get(), 16 * 1024 * 1024);
        assert!(args.metrics_addr.is_none());
    }

    #[test]
    fn parses_send_options() {
        let cli = Cli::parse_from([
            "snapwire",
            "send",
            "--to",
            "127.0.0.1:3333",
            "--file",
            "frame.jpg",
            "--mtu",
            "512",
            "--repeat",
            "3",
            "--reverse",
        ]);
        let Command::Send(args) = cli.command else {
            panic!("expected send subcommand");
        };
        assert_eq!(args.to.port(), 3333);
        assert_eq!(args.mtu.get(), 512);
        assert_eq!(args.repeat, 3);
        assert_eq!(args.interval_ms, 100);
        assert!(args.reverse);
    }

    #[rstest]
    #[case::save_conflict(&["snapwire", "listen", "--save", "/tmp/x.jpg", "--no-save"])]
    #[case::zero_frame_cap(&["snapwire", "listen", "--max-frame-size", "0"])]
    #[case::missing_target(&["snapwire", "send", "--file", "frame.jpg"])]
    fn rejects_invalid_arguments(#[case] argv: &[&str]) {
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
