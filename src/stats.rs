use crate::record::GameRecord;
use ncaa_api::clock::{format_elapsed, period_label};
use serde::Serialize;
use std::fmt;

/// Margin ranges used when asking "how often does the first team to 69 hold on?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum MarginBucket {
    Down15Plus,
    Down11To15,
    Down6To10,
    Down1To5,
    Tied,
    Up1To5,
    Up6To10,
    Up11To15,
    Up15Plus,
}

impl MarginBucket {
    pub fn of(margin: i32) -> Self {
        match margin {
            i32::MIN..=-16 => MarginBucket::Down15Plus,
            -15..=-11 => MarginBucket::Down11To15,
            -10..=-6 => MarginBucket::Down6To10,
            -5..=-1 => MarginBucket::Down1To5,
            0 => MarginBucket::Tied,
            1..=5 => MarginBucket::Up1To5,
            6..=10 => MarginBucket::Up6To10,
            11..=15 => MarginBucket::Up11To15,
            16..=i32::MAX => MarginBucket::Up15Plus,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MarginBucket::Down15Plus => "Down 15+",
            MarginBucket::Down11To15 => "Down 11-15",
            MarginBucket::Down6To10 => "Down 6-10",
            MarginBucket::Down1To5 => "Down 1-5",
            MarginBucket::Tied => "Tied",
            MarginBucket::Up1To5 => "Up 1-5",
            MarginBucket::Up6To10 => "Up 6-10",
            MarginBucket::Up11To15 => "Up 11-15",
            MarginBucket::Up15Plus => "Up 15+",
        }
    }
}

/// How long into the game the mark was reached, in 10 minute steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum TimeBucket {
    Under10,
    From10To20,
    From20To30,
    From30To40,
    Over40,
}

impl TimeBucket {
    pub fn of(elapsed_seconds: u32) -> Self {
        match elapsed_seconds {
            0..600 => TimeBucket::Under10,
            600..1200 => TimeBucket::From10To20,
            1200..1800 => TimeBucket::From20To30,
            1800..2400 => TimeBucket::From30To40,
            _ => TimeBucket::Over40,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeBucket::Under10 => "0-10 min",
            TimeBucket::From10To20 => "10-20 min",
            TimeBucket::From20To30 => "20-30 min",
            TimeBucket::From30To40 => "30-40 min",
            TimeBucket::Over40 => "40+ min",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub events: u32,
    pub wins: u32,
    pub losses: u32,
    margin_total: i64,
}

impl Tally {
    fn add(&mut self, r69w: Option<bool>, margin: i32) {
        self.events += 1;
        self.margin_total += i64::from(margin);
        match r69w {
            Some(true) => self.wins += 1,
            Some(false) => self.losses += 1,
            None => {}
        }
    }

    /// Wins over decided games, as a percentage.
    pub fn win_rate(&self) -> Option<f64> {
        let decided = self.wins + self.losses;
        (decided > 0).then(|| f64::from(self.wins) * 100.0 / f64::from(decided))
    }

    /// Mean margin at the crossing.
    pub fn average_margin(&self) -> Option<f64> {
        (self.events > 0).then(|| self.margin_total as f64 / f64::from(self.events))
    }
}

fn tally_into<K: Ord + Copy>(rows: &mut Vec<(K, Tally)>, key: K, r69w: Option<bool>, margin: i32) {
    let idx = match rows.binary_search_by_key(&key, |(k, _)| *k) {
        Ok(idx) => idx,
        Err(idx) => {
            rows.insert(idx, (key, Tally::default()));
            idx
        }
    };
    rows[idx].1.add(r69w, margin);
}

/// A memorable race: who crossed, against whom, and how it ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extreme {
    pub game_id: String,
    pub team: String,
    pub opponent: String,
    pub margin: i32,
    /// Final margin from the crossing team's side.
    pub final_margin: i32,
}

impl Extreme {
    fn of(record: &GameRecord) -> Option<Self> {
        let event = record.event.as_ref()?;
        let game = &record.game;
        let (ours, theirs) = match event.side {
            ncaa_api::Side::Home => (&game.home, &game.away),
            ncaa_api::Side::Away => (&game.away, &game.home),
        };
        let (ours_final, theirs_final) = match event.side {
            ncaa_api::Side::Home => (game.home_score, game.away_score),
            ncaa_api::Side::Away => (game.away_score, game.home_score),
        };
        Some(Self {
            game_id: game.id.clone(),
            team: ours.short_name.clone(),
            opponent: theirs.short_name.clone(),
            margin: event.margin,
            final_margin: i32::from(ours_final) - i32::from(theirs_final),
        })
    }
}

/// Aggregate race outcomes over a batch of games.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RaceStats {
    pub games: u32,
    pub overall: Tally,
    pub home_first: u32,
    pub overtime_events: u32,
    total_elapsed: u64,
    pub by_margin: Vec<(MarginBucket, Tally)>,
    pub by_period: Vec<(u8, Tally)>,
    pub by_time: Vec<(TimeBucket, Tally)>,
    /// Races where the crossing team was behind at the crossing.
    pub trailing: Tally,
    /// Won after crossing from furthest behind.
    pub biggest_comeback: Option<Extreme>,
    /// Lost after crossing with the biggest lead.
    pub biggest_blown_lead: Option<Extreme>,
    /// Crossing team lost the lead afterwards and got it back.
    pub comebacks: u32,
    pub nice_games: u32,
    pub double_nice_games: u32,
}

impl RaceStats {
    pub fn add(&mut self, record: &GameRecord) {
        self.games += 1;
        if record.game.is_final() {
            self.nice_games += u32::from(record.analytics.nice_score);
            self.double_nice_games += u32::from(record.analytics.double_nice);
        }
        let Some(event) = &record.event else {
            return;
        };

        let (r69w, margin) = (record.r69w, event.margin);
        self.overall.add(r69w, margin);
        self.total_elapsed += u64::from(event.elapsed_seconds);
        if event.is_home() {
            self.home_first += 1;
        }
        if event.period > 2 {
            self.overtime_events += 1;
        }
        if margin < 0 {
            self.trailing.add(r69w, margin);
        }
        if record.analytics.race.is_some_and(|race| race.comeback) {
            self.comebacks += 1;
        }

        tally_into(&mut self.by_margin, MarginBucket::of(margin), r69w, margin);
        tally_into(&mut self.by_period, event.period.max(1), r69w, margin);
        tally_into(&mut self.by_time, TimeBucket::of(event.elapsed_seconds), r69w, margin);

        match r69w {
            Some(true) if margin < 0 => {
                if self.biggest_comeback.as_ref().is_none_or(|e| margin < e.margin) {
                    self.biggest_comeback = Extreme::of(record);
                }
            }
            Some(false) if margin > 0 => {
                if self.biggest_blown_lead.as_ref().is_none_or(|e| margin > e.margin) {
                    self.biggest_blown_lead = Extreme::of(record);
                }
            }
            _ => {}
        }
    }

    pub fn average_elapsed(&self) -> Option<u32> {
        let events = u64::from(self.overall.events);
        (events > 0).then(|| u32::try_from(self.total_elapsed / events).unwrap_or(u32::MAX))
    }
}

impl<'a> FromIterator<&'a GameRecord> for RaceStats {
    fn from_iter<I: IntoIterator<Item = &'a GameRecord>>(iter: I) -> Self {
        let mut stats = RaceStats::default();
        for record in iter {
            stats.add(record);
        }
        stats
    }
}

fn pct(rate: Option<f64>) -> String {
    rate.map(|r| format!("{r:.1}%")).unwrap_or_else(|| "-".into())
}

fn avg(margin: Option<f64>) -> String {
    margin.map(|m| format!("{m:+.1}")).unwrap_or_else(|| "-".into())
}

fn write_table<K>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    rows: &[(K, Tally)],
    label: impl Fn(&K) -> String,
) -> fmt::Result {
    if rows.is_empty() {
        return Ok(());
    }
    writeln!(f)?;
    writeln!(
        f,
        "{title:<12} | {:>6} | {:>5} | {:>8} | {:>10}",
        "Games", "Wins", "Win rate", "Avg margin"
    )?;
    writeln!(f, "{}", "-".repeat(54))?;
    for (key, tally) in rows {
        writeln!(
            f,
            "{:<12} | {:>6} | {:>5} | {:>8} | {:>10}",
            label(key),
            tally.events,
            tally.wins,
            pct(tally.win_rate()),
            avg(tally.average_margin())
        )?;
    }
    Ok(())
}

fn write_extreme(f: &mut fmt::Formatter<'_>, title: &str, extreme: &Extreme) -> fmt::Result {
    writeln!(
        f,
        "{title:<18}{} {:+} at the mark vs {}, finished {:+} (game {})",
        extreme.team, extreme.margin, extreme.opponent, extreme.final_margin, extreme.game_id
    )
}

impl fmt::Display for RaceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Games scanned:    {}", self.games)?;
        writeln!(f, "Races detected:   {}", self.overall.events)?;
        writeln!(
            f,
            "R69W:             {} won, {} lost ({})",
            self.overall.wins,
            self.overall.losses,
            pct(self.overall.win_rate())
        )?;
        if let Some(avg) = self.average_elapsed() {
            writeln!(f, "Avg time to mark: {}", format_elapsed(avg))?;
        }
        writeln!(f, "Home first:       {}", self.home_first)?;
        writeln!(f, "In overtime:      {}", self.overtime_events)?;
        writeln!(f, "Comebacks:        {}", self.comebacks)?;
        writeln!(f, "Nice finals:      {} ({} double)", self.nice_games, self.double_nice_games)?;
        if self.trailing.events > 0 {
            writeln!(
                f,
                "Trailing at mark: {} won of {} ({})",
                self.trailing.wins,
                self.trailing.events,
                pct(self.trailing.win_rate())
            )?;
        }
        if let Some(extreme) = &self.biggest_comeback {
            write_extreme(f, "Biggest comeback: ", extreme)?;
        }
        if let Some(extreme) = &self.biggest_blown_lead {
            write_extreme(f, "Biggest collapse: ", extreme)?;
        }

        write_table(f, "Margin", &self.by_margin, |b| b.label().to_owned())?;
        write_table(f, "Period", &self.by_period, |p| period_label(*p))?;
        write_table(f, "Time to mark", &self.by_time, |t| t.label().to_owned())?;
        Ok(())
    }
}
