use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use isawait::{ConfigSpace, Discovery, PciAccess, RecoveryRequest, Session, Width, WidthOutcome};

mod logger;

const EXIT_FATAL: u8 = 1;
/// Same code clap uses for its own usage errors.
const EXIT_USAGE: u8 = 2;
const EXIT_PARTIAL: u8 = 3;

#[derive(Parser, Debug)]
#[command(
    name = "isawait",
    version,
    about = "Sets the ISA I/O recovery / wait state timer.",
    long_about = "Sets the ISA I/O recovery / wait state timer on Intel PIIX/PIIX3/PIIX4(E) and \
                  SiS 5113/559x chipsets.\n\
                  It can be useful to debug malfunctioning ISA devices (e.g. OPL2/3 synthesizer chip)."
)]
struct Args {
    /// 8-bit I/O recovery clocks: 1 to 8, 0 to disable, -1 or any negative value to keep
    #[arg(
        allow_negative_numbers = true,
        required_unless_present = "list",
        value_name = "8 BIT CYCLES"
    )]
    recovery_8: Option<i16>,

    /// 16-bit I/O recovery clocks: 1 to 4, 0 to disable, -1 or any negative value to keep
    #[arg(
        allow_negative_numbers = true,
        required_unless_present = "list",
        value_name = "16 BIT CYCLES"
    )]
    recovery_16: Option<i16>,

    /// List the devices on the PCI bus instead of changing anything
    #[arg(long, action = clap::ArgAction::SetTrue, conflicts_with_all = ["recovery_8", "recovery_16"])]
    list: bool,

    /// Log more (-v info, -vv every probed device, -vvv every register access)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, action = clap::ArgAction::SetTrue, conflicts_with = "verbose")]
    quiet: bool,

    /// Don't color log output
    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_color: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let verbosity = if args.quiet {
        -1
    } else {
        args.verbose.min(i8::MAX as u8) as i8
    };
    if let Err(error) = logger::init(verbosity, !args.no_color) {
        eprintln!("failed to set up logging: {error}");
    }

    println!("ISAWAIT Version {}", env!("CARGO_PKG_VERSION"));
    println!("----------------------------------------");

    match run(args) {
        Ok(exit_code) => exit_code,
        Err(error) => {
            eprintln!("ERROR - {error:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    if args.list {
        let mut pci = open_pci()?;
        pci.self_test().context("enumerating PCI bus")?;
        for device in isawait::list_devices(&mut pci) {
            println!("{device}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Reject bad values before touching any hardware
    let requests = [
        (Width::Bits8, args.recovery_8),
        (Width::Bits16, args.recovery_16),
    ]
    .map(|(width, value)| RecoveryRequest::parse(width, value.unwrap_or(-1)));
    let [request_8, request_16] = match requests {
        [Ok(request_8), Ok(request_16)] => [request_8, request_16],
        [Err(error), _] | [_, Err(error)] => {
            eprintln!("{error}");
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    };

    let mut pci = open_pci()?;
    let discovery = isawait::discover(&mut pci)?;
    print_discovery(&discovery);
    let session = discovery.apply(&mut pci, request_8, request_16)?;
    print_session(&session);

    Ok(if session.is_complete() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_PARTIAL)
    })
}

/// Configuration mechanism #1. Not yet self tested.
fn open_pci() -> anyhow::Result<PciAccess> {
    acquire_io_privilege()?;
    // Safety: we hold I/O privilege and nothing else in this process uses 0xCF8..0xCFF
    Ok(unsafe { PciAccess::new_pci() })
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
fn acquire_io_privilege() -> anyhow::Result<()> {
    // Safety: only raises this process's I/O privilege level
    if unsafe { libc::iopl(3) } != 0 {
        return Err(std::io::Error::last_os_error())
            .context("failed to get I/O port access (are you root?)");
    }
    Ok(())
}

/// Elsewhere the program is assumed to already run with I/O privilege.
#[cfg(not(all(target_os = "linux", target_arch = "x86_64")))]
fn acquire_io_privilege() -> anyhow::Result<()> {
    Ok(())
}

fn print_discovery(discovery: &Discovery) {
    let device = &discovery.device;
    let chipset = device.chipset();
    println!(
        "Found supported device, vendor 0x{:04x}, device 0x{:04x} ({}) at {:02x}:{:02x}.0",
        chipset.vendor_id,
        chipset.device_id,
        chipset.name,
        device.bus_number(),
        device.device_number()
    );
    println!("Current values:");
    println!("{}", discovery.before);
}

fn print_session(session: &Session) {
    for width in [Width::Bits8, Width::Bits16] {
        match session.outcome(width) {
            WidthOutcome::Unchanged => println!("Leaving {width} I/O recovery unchanged."),
            WidthOutcome::Applied => {}
            WidthOutcome::Failed(error) => println!("ERROR: {error}, {width} left unchanged."),
        }
    }

    println!();
    println!("New values written. The register now contains:");
    println!("{}", session.after);
}
