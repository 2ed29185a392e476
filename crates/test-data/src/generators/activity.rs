//! Activity generation.

use dashboard::models::{ActivityRecord, ElevationRow, Sport};
use rand::Rng;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    config::BoundingBox,
    profiles::SportProfile,
    sources::{ProceduralGenerator, decimate},
    terrain::{ElevationGenerator, add_elevation_jitter},
};

/// Samples kept per point of the summary polyline.
const POLYLINE_STEP: usize = 8;

/// Generated activity with the totals the aggregate endpoints need.
#[derive(Debug, Clone)]
pub struct GeneratedActivity {
    pub sport: Sport,
    pub started_at: OffsetDateTime,
    pub distance_km: f64,
    pub moving_time_s: f64,
    pub elevation_gain_m: f64,
    /// Wire form served by the activity endpoints.
    pub record: ActivityRecord,
    pub streams: Vec<ElevationRow>,
}

#[derive(Debug, Clone)]
pub struct ActivityNameConfig {
    pub run: Vec<&'static str>,
    pub trail: Vec<&'static str>,
    pub bike: Vec<&'static str>,
    pub swim: Vec<&'static str>,
    pub suffixes: Vec<&'static str>,
}

impl Default for ActivityNameConfig {
    fn default() -> Self {
        Self {
            run: vec!["Footing", "Sortie longue", "Fractionné", "Course du matin", "Tempo"],
            trail: vec!["Trail", "Sortie montagne", "Rando-course", "Côtes"],
            bike: vec!["Sortie vélo", "Col", "Vélo du dimanche", "Gravel"],
            swim: vec!["Natation", "Séance piscine", "Eau libre"],
            suffixes: vec!["au bord du lac", "dans les Bauges", "au Semnoz", "en forêt"],
        }
    }
}

/// Builds activities for one training region.
#[derive(Debug, Clone)]
pub struct ActivityGenerator {
    region: BoundingBox,
    terrain: ElevationGenerator,
    names: ActivityNameConfig,
    invalid_sample_rate: f64,
}

impl ActivityGenerator {
    pub fn new(region: BoundingBox, seed: u32) -> Self {
        Self {
            region,
            terrain: ElevationGenerator::alpine(seed),
            names: ActivityNameConfig::default(),
            invalid_sample_rate: 0.0,
        }
    }

    pub fn with_terrain(mut self, terrain: ElevationGenerator) -> Self {
        self.terrain = terrain;
        self
    }

    pub fn with_invalid_samples(mut self, rate: f64) -> Self {
        self.invalid_sample_rate = rate;
        self
    }

    pub fn generate(
        &self,
        sport: Sport,
        started_at: OffsetDateTime,
        rng: &mut impl Rng,
    ) -> GeneratedActivity {
        let profile = SportProfile::for_sport(sport);
        let target_km = profile.sample_distance_km(rng);
        let form = profile.sample_variance(rng);

        let (coords, polyline, streams) = if profile.has_gps {
            let trace = ProceduralGenerator::for_region(self.region)
                .with_distance(target_km * 1000.0)
                .with_invalid_samples(self.invalid_sample_rate);
            let path = trace.generate_path(rng);
            let mut streams = self.terrain.streams(&path);
            add_elevation_jitter(&mut streams, rng, 2.0);

            let coords = trace.to_samples(&path, rng);
            let polyline = decimate(&coords, POLYLINE_STEP);
            (coords, polyline, streams)
        } else {
            (Vec::new(), Vec::new(), Vec::new())
        };

        let distance_km = streams
            .last()
            .and_then(|row| row.distance_m)
            .map_or(target_km, |m| m / 1000.0);
        let elevation_gain_m = elevation_gain(&streams);
        let moving_time_s = moving_time(&profile, &streams, distance_km, form);
        let speed_kmh = if moving_time_s > 0.0 {
            distance_km / (moving_time_s / 3600.0)
        } else {
            0.0
        };

        let record = ActivityRecord {
            name: Some(self.name(sport, rng)),
            sport_type: Some(sport.as_str().to_string()),
            date: Some(started_at.date().to_string()),
            start_date: started_at.format(&Rfc3339).ok(),
            distance_km: Some(round_to(distance_km, 2)),
            duree_hms: Some(format_hms(moving_time_s)),
            denivele_m: Some(elevation_gain_m.round()),
            vitesse_kmh: Some(round_to(speed_kmh, 1)),
            allure_min_per_km: format_pace(moving_time_s, distance_km),
            coords,
            polyline_coords: polyline,
        };

        GeneratedActivity {
            sport,
            started_at,
            distance_km,
            moving_time_s,
            elevation_gain_m,
            record,
            streams,
        }
    }

    fn name(&self, sport: Sport, rng: &mut impl Rng) -> String {
        let prefixes = match sport {
            Sport::Run => &self.names.run,
            Sport::Trail => &self.names.trail,
            Sport::Bike => &self.names.bike,
            Sport::Swim => &self.names.swim,
        };
        let prefix = prefixes[rng.gen_range(0..prefixes.len())];

        if sport != Sport::Swim && rng.r#gen::<f64>() < 0.3 {
            let suffix = self.names.suffixes[rng.gen_range(0..self.names.suffixes.len())];
            format!("{prefix} {suffix}")
        } else {
            prefix.to_string()
        }
    }
}

/// Sum of positive altitude differences.
fn elevation_gain(streams: &[ElevationRow]) -> f64 {
    streams
        .windows(2)
        .filter_map(|w| Some((w[1].altitude? - w[0].altitude?).max(0.0)))
        .sum()
}

/// Moving time from the per-segment grade; flat estimate without streams.
fn moving_time(profile: &SportProfile, streams: &[ElevationRow], distance_km: f64, form: f64) -> f64 {
    if streams.len() < 2 {
        return distance_km * 1000.0 / profile.speed_at_grade(0.0, form);
    }

    streams
        .windows(2)
        .filter_map(|w| {
            let distance = w[1].distance_m? - w[0].distance_m?;
            let climb = w[1].altitude? - w[0].altitude?;
            let grade = if distance > 0.0 { climb / distance } else { 0.0 };
            Some(distance / profile.speed_at_grade(grade, form))
        })
        .sum()
}

/// `H:MM:SS`.
pub fn format_hms(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}:{:02}", total / 3600, total % 3600 / 60, total % 60)
}

/// Pace as `M:SS` per km, `None` for zero distance.
pub fn format_pace(seconds: f64, distance_km: f64) -> Option<String> {
    if distance_km <= 0.0 || seconds <= 0.0 {
        return None;
    }
    let per_km = (seconds / distance_km).round() as u64;
    Some(format!("{}:{:02}", per_km / 60, per_km % 60))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Region;
    use rand::{SeedableRng, rngs::StdRng};
    use time::macros::datetime;

    fn generator() -> ActivityGenerator {
        ActivityGenerator::new(Region::ANNECY, 42)
    }

    #[test]
    fn test_run_activity() {
        let mut rng = StdRng::seed_from_u64(1);
        let started = datetime!(2025-03-04 07:30 UTC);
        let activity = generator().generate(Sport::Run, started, &mut rng);
        let record = &activity.record;

        assert_eq!(record.sport_type.as_deref(), Some("Run"));
        assert_eq!(record.start_day(), Some(started.date()));
        assert!(record.name.is_some());
        assert!(!record.coords.is_empty());
        assert!(record.polyline_coords.len() < record.coords.len());
        assert!(!activity.streams.is_empty());
        assert!(activity.distance_km > 4.0);
        assert!(activity.moving_time_s > 0.0);
        assert!(record.allure_min_per_km.is_some());
    }

    #[test]
    fn test_swim_has_no_trace() {
        let mut rng = StdRng::seed_from_u64(2);
        let activity = generator().generate(Sport::Swim, datetime!(2025-03-05 12:00 UTC), &mut rng);

        assert!(activity.record.trace().is_empty());
        assert!(activity.streams.is_empty());
        assert!(activity.distance_km >= 1.0);
        assert_eq!(activity.elevation_gain_m, 0.0);
        assert!(activity.moving_time_s > 0.0);
    }

    #[test]
    fn test_record_round_trips_as_json() {
        let mut rng = StdRng::seed_from_u64(3);
        let activity = generator()
            .with_invalid_samples(0.2)
            .generate(Sport::Trail, datetime!(2025-03-08 09:00 UTC), &mut rng);

        let json = serde_json::to_string(&activity.record).unwrap();
        let parsed: ActivityRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.coords.len(), activity.record.coords.len());
        assert!(parsed.coords.iter().any(|s| s.coord().is_none()));
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_hms(3725.0), "1:02:05");
        assert_eq!(format_hms(59.6), "0:01:00");
        assert_eq!(format_pace(1500.0, 5.0), Some("5:00".to_string()));
        assert_eq!(format_pace(1500.0, 0.0), None);
    }
}
