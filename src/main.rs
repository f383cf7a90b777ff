use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Mount a chunkfs master as a local filesystem")]
struct Args {
    /// Base URL of the master, e.g. http://127.0.0.1:8080
    #[arg(long)]
    master: String,
    /// Empty directory to mount on (created if missing)
    #[arg(long)]
    mountpoint: String,
    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,
    /// Chunk size in bytes
    #[arg(long, default_value_t = chunkfs::chunk::layout::DEFAULT_CHUNK_SIZE)]
    chunk_size: u64,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    #[cfg(not(target_os = "linux"))]
    {
        eprintln!(
            "chunkfs only mounts on Linux (FUSE).\nIf you're on Windows, please run under WSL/WSL2 or a Linux host."
        );
        std::process::exit(2);
    }

    #[cfg(target_os = "linux")]
    {
        use std::time::Duration;

        use chunkfs::chunk::ChunkLayout;
        use chunkfs::fuse::mount::mount_remote_unprivileged;
        use chunkfs::rpc::{HttpMaster, MasterConfig};
        use chunkfs::vfs::fs::RemoteFs;

        let args = Args::parse();

        let config = MasterConfig::new(&args.master)
            .with_timeout(Duration::from_millis(args.timeout_ms));
        let master = match HttpMaster::new(&config) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("master client init failed: {e}");
                std::process::exit(1);
            }
        };
        let fs = RemoteFs::new(ChunkLayout::new(args.chunk_size), master);

        if let Err(e) = std::fs::create_dir_all(&args.mountpoint) {
            eprintln!("create mount point failed: {e}");
            std::process::exit(1);
        }

        println!(
            "Mounting chunkfs at {} (master: {})...",
            args.mountpoint, args.master
        );
        println!("Press Ctrl+C to unmount and exit.");
        let mut mount_handle =
            match mount_remote_unprivileged(fs, std::path::Path::new(&args.mountpoint)).await {
                Ok(h) => h,
                Err(e) => {
                    eprintln!(
                        "mount failed: {e}\n\nHint: ensure you are on Linux with FUSE (fusermount3) available."
                    );
                    std::process::exit(1);
                }
            };

        let handle = &mut mount_handle;
        tokio::select! {
            res = handle => {
                if let Err(e) = res {
                    eprintln!("fuse session error: {e}");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Unmounting...");
                if let Err(e) = mount_handle.unmount().await {
                    eprintln!("unmount error: {e}");
                }
            }
        }
    }
}
