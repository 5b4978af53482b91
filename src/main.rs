/*
 *  main.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Command line front end - one-shot drawing, clock faces, scenes
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, Timelike};
use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};

use flipdots::config::{self, Cli, Command, Config, Setting};
use flipdots::constants::CLOCK_POLL_MS;
use flipdots::graphics::codec;
use flipdots::panel::{ProgrammingResponse, Protocol, open_serial};
use flipdots::scene::{DrawOp, PanelHub, PanelSpec, SceneFile, TextStyle};
use flipdots::text::{FontResolver, SystemQuery};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        println!("{}", serde_yaml::to_string(&cfg)?);
        return Ok(());
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level())).init();
    info!("flipdots v{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let Some(command) = cli.command.clone() else {
        bail!("no command given, see --help");
    };

    if let Err(e) = run(&cli, &cfg, command) {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

fn run(cli: &Cli, cfg: &Config, command: Command) -> Result<()> {
    match command {
        Command::Fonts => {
            let query = SystemQuery::new();
            for name in query.index().names() {
                println!("{name}");
            }
            return Ok(());
        }
        Command::Program => return program(cli, cfg),
        _ => {}
    }

    let specs = cfg.panel_specs()?;
    let target = target_panel(cli, &specs)?;
    let mut hub = open_hub(cli, cfg, &specs)?;

    match command {
        Command::Text { text, args } => {
            hub.submit(&target, DrawOp::Text { text, style: args.style() })?;
            commit(&mut hub, cli.dry_run)?;
        }
        Command::Vtext { text, args, spacing, char_align } => {
            let style = TextStyle { spacing, char_align, ..args.style() };
            hub.submit(&target, DrawOp::VerticalText { text, style })?;
            commit(&mut hub, cli.dry_run)?;
        }
        Command::Image { path, placement } => {
            hub.submit(&target, DrawOp::Bitmap { image: path, placement: placement.placement() })?;
            commit(&mut hub, cli.dry_run)?;
        }
        Command::Clock { face, font, once } => {
            let mut last_minute = None;
            loop {
                let minute = Local::now().minute();
                if last_minute != Some(minute) {
                    for op in face.ops(font.as_deref()) {
                        hub.submit(&target, op)?;
                    }
                    // a missed frame is retried on the next minute
                    if let Err(e) = commit(&mut hub, cli.dry_run) {
                        if once {
                            return Err(e);
                        }
                        warn!("clock frame not shown: {:#}", e);
                    }
                    last_minute = Some(minute);
                }
                if once {
                    break;
                }
                thread::sleep(Duration::from_millis(CLOCK_POLL_MS));
            }
        }
        Command::Set { setting, on } => {
            match setting {
                Setting::Backlight => hub.set_backlight(&target, on)?,
                Setting::Inverting => hub.set_inverting(&target, on)?,
                Setting::Active => hub.set_active(&target, on)?,
                Setting::QuickUpdate => hub.set_quick_update(&target, on)?,
            }
            info!("{:?} on '{}' set to {}", setting, target, on);
        }
        Command::Scene { file } => {
            let scene = SceneFile::load(&file)
                .with_context(|| format!("reading scene {}", file.display()))?;
            hub.apply_scene(&scene)?;
            commit(&mut hub, cli.dry_run)?;
        }
        Command::Info => {
            println!("{}", serde_json::to_string_pretty(&hub.hardware())?);
        }
        Command::Fonts | Command::Program => unreachable!("handled before the hub opens"),
    }
    Ok(())
}

fn target_panel(cli: &Cli, specs: &[PanelSpec]) -> Result<String> {
    match cli.panel.as_deref() {
        Some(name) if specs.iter().any(|s| s.name == name) => Ok(name.to_string()),
        Some(name) => bail!("no panel named '{name}'"),
        None => specs
            .first()
            .map(|s| s.name.clone())
            .ok_or_else(|| anyhow!("no panels configured")),
    }
}

fn open_hub(cli: &Cli, cfg: &Config, specs: &[PanelSpec]) -> Result<PanelHub> {
    let fonts = || (FontResolver::new(cfg.font_dir()), cfg.default_font());
    if cli.dry_run {
        info!("Dry run: rendering {} panel(s) without a device", specs.len());
        return Ok(PanelHub::offline(specs, fonts));
    }
    let port = open_serial(&cfg.serial_settings())?;
    Ok(PanelHub::open(port, specs, fonts))
}

/// Send everything queued; in a dry run show the frames instead
fn commit(hub: &mut PanelHub, dry_run: bool) -> Result<()> {
    let sent = hub.commit()?;
    if dry_run {
        for name in &sent {
            print_frame(hub, name)?;
        }
    }
    Ok(())
}

fn print_frame(hub: &PanelHub, name: &str) -> Result<()> {
    let height = hub
        .hardware()
        .into_iter()
        .find(|p| p.name == name)
        .map(|p| p.height)
        .ok_or_else(|| anyhow!("no panel named '{name}'"))?;
    let Some(bitmap) = hub.last_bitmap(name)? else {
        return Ok(());
    };
    let frame = codec::decode(bitmap, height)?;
    println!("{name}:");
    for y in 0..frame.height() {
        let row: String = (0..frame.width())
            .map(|x| if frame.is_lit(x, y) { '#' } else { '.' })
            .collect();
        println!("{row}");
    }
    Ok(())
}

/// Open the addressed mux port for flashing. The bootloader upload itself
/// is left to the external programmer.
fn program(cli: &Cli, cfg: &Config) -> Result<()> {
    if cli.dry_run {
        bail!("programming mode needs a device");
    }
    let specs = cfg.panel_specs()?;
    let target = target_panel(cli, &specs)?;
    let Some(address) = specs.iter().find(|s| s.name == target).and_then(|s| s.address) else {
        bail!("panel '{target}' has no mux address, pass --address");
    };

    let mut protocol = Protocol::new(open_serial(&cfg.serial_settings())?, None);
    match protocol.enter_programming_mode(address)? {
        ProgrammingResponse::Responded(code) => info!("controller on {} answered 0x{:02X}", address, code),
        ProgrammingResponse::Silent => info!("controller on {} is silent, assuming bootloader", address),
    }
    protocol.open_passthrough(address)?;
    println!("{address} is in pass-through; run the programmer on {}", cfg.serial_settings().port);
    Ok(())
}
