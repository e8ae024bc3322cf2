// NMEA log replay example.
// Replays a recorded NMEA log in simulation mode, on a synthetic clock,
// and prints every update that the source surfaces.
use std::{env, fs::File, io::BufReader};

use nmea_sat::prelude::{
    Config, Duration, Epoch, Error, Event, LineDevice, NmeaReplay, SatelliteSource,
};

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = env::args()
        .nth(1)
        .ok_or("usage: replay <path/to/log.nmea> [read interval (ms)]")?;

    let read_interval_ms = match env::args().nth(2) {
        Some(value) => value.parse::<f64>()?,
        None => 100.0,
    };

    let fd = File::open(&path)?;
    let replay = NmeaReplay::new(BufReader::new(fd));

    // Simulation mode reads one complete update per read interval.
    // The update interval remains null: everything new is surfaced.
    let cfg = Config::simulation_preset(Duration::from_milliseconds(read_interval_ms));

    let mut source = SatelliteSource::new(cfg);
    source.set_device(replay);

    // Synthetic clock: replays run as fast as possible
    let mut now = Epoch::from_gregorian_utc_at_midnight(2024, 1, 1);
    source.start_updates(now);

    let mut updates = 0;

    loop {
        let at_end = source.device().map(|dev| dev.at_end()).unwrap_or(true);
        if at_end {
            break;
        }

        now = match source.next_deadline() {
            Some(deadline) => deadline,
            None => break,
        };

        source.poll(now);

        for event in source.drain_events() {
            match event {
                Event::SatellitesInView(sats) => {
                    updates += 1;
                    println!("{} - {} satellites in view", now, sats.len());
                    for sat in sats.iter() {
                        match sat.sv() {
                            Some(sv) => println!("    {} ({})", sat, sv),
                            None => println!("    {}", sat),
                        }
                    }
                },
                Event::SatellitesInUse(sats) => {
                    let used = sats
                        .iter()
                        .map(|sat| format!("{:?}({})", sat.system, sat.id))
                        .collect::<Vec<_>>();
                    println!("{} - {} satellites in use: {}", now, sats.len(), used.join(" "));
                },
                Event::Error(Error::UpdateTimeout) => {
                    println!("{} - update timeout", now);
                },
                Event::Error(e) => {
                    return Err(e.into());
                },
            }
        }
    }

    source.stop_updates();
    println!("{}: {} updates", path, updates);
    Ok(())
}
