use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use ordered_float::OrderedFloat;

use crate::types::{
    AggregateMetrics, AveragingPolicy, BestValues, ComboStat, FetchedPunch, Measured, MetricKind,
    ProgressPoint, PunchMetrics, PunchRecord, PunchType, SessionProgress, TrainingSession,
    TypeBreakdown, Weakness,
};

/// Hvor langt under totalsnittet en slagtype må ligge for å regnes som svakhet.
pub const WEAKNESS_MARGIN: f64 = 0.10;

/// Ikke-finite verdier (NaN/inf) regnes som manglende.
#[inline]
fn clean(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

fn mean_of<T: Measured>(records: &[T], kind: MetricKind, policy: AveragingPolicy) -> f64 {
    let mut sum = 0.0f64;
    let mut cnt = 0usize;
    for r in records {
        match (clean(r.metric(kind)), policy) {
            (Some(v), _) => {
                sum += v;
                cnt += 1;
            }
            (None, AveragingPolicy::ZeroFill) => cnt += 1,
            (None, AveragingPolicy::SkipMissing) => {}
        }
    }
    if cnt == 0 { 0.0 } else { sum / cnt as f64 }
}

/// Snitt over hele lista; manglende felt teller som 0. Tom liste gir 0 overalt.
pub fn aggregate<T: Measured>(records: &[T]) -> AggregateMetrics {
    aggregate_with(records, AveragingPolicy::ZeroFill)
}

pub fn aggregate_with<T: Measured>(records: &[T], policy: AveragingPolicy) -> AggregateMetrics {
    AggregateMetrics {
        total_punches: records.len(),
        average_speed: mean_of(records, MetricKind::Speed, policy),
        average_force: mean_of(records, MetricKind::Force, policy),
        average_accuracy: mean_of(records, MetricKind::Accuracy, policy),
    }
}

/// Antall per slagtype. Alle fire typer er alltid med.
pub fn punch_type_distribution<T: Measured>(records: &[T]) -> BTreeMap<PunchType, usize> {
    let mut dist: BTreeMap<PunchType, usize> = PunchType::ALL.iter().map(|t| (*t, 0)).collect();
    for r in records {
        *dist.entry(r.punch_type()).or_insert(0) += 1;
    }
    dist
}

/// Aggregat per slagtype, kun typer som faktisk forekommer (i `PunchType::ALL`-rekkefølge).
pub fn by_punch_type<T: Measured + Clone>(
    records: &[T],
    policy: AveragingPolicy,
) -> Vec<TypeBreakdown> {
    PunchType::ALL
        .iter()
        .filter_map(|t| {
            let subset: Vec<T> = records.iter().filter(|r| r.punch_type() == *t).cloned().collect();
            if subset.is_empty() {
                None
            } else {
                Some(TypeBreakdown { punch_type: *t, metrics: aggregate_with(&subset, policy) })
            }
        })
        .collect()
}

fn best_of<T: Measured>(records: &[T], kind: MetricKind) -> f64 {
    records
        .iter()
        .filter_map(|r| clean(r.metric(kind)))
        .map(OrderedFloat)
        .max()
        .map(|v| v.into_inner())
        .unwrap_or(0.0)
}

pub fn best_values<T: Measured>(records: &[T]) -> BestValues {
    BestValues {
        best_speed: best_of(records, MetricKind::Speed),
        best_force: best_of(records, MetricKind::Force),
        best_accuracy: best_of(records, MetricKind::Accuracy),
    }
}

/// Dagssnitt (UTC-dato) for fart og kraft, stigende dato.
pub fn daily_progression(
    records: &[FetchedPunch],
    policy: AveragingPolicy,
) -> (Vec<ProgressPoint>, Vec<ProgressPoint>) {
    let mut by_day: BTreeMap<NaiveDate, Vec<FetchedPunch>> = BTreeMap::new();
    for r in records {
        by_day.entry(r.timestamp.date_naive()).or_default().push(r.clone());
    }

    let mut speed = Vec::with_capacity(by_day.len());
    let mut force = Vec::with_capacity(by_day.len());
    for (date, day) in &by_day {
        let agg = aggregate_with(day, policy);
        speed.push(ProgressPoint { date: *date, value: agg.average_speed });
        force.push(ProgressPoint { date: *date, value: agg.average_force });
    }
    (speed, force)
}

/// Snitt per økt, i samme rekkefølge som `sessions`. Tomme økter gir nuller.
pub fn session_progression(
    sessions: &[TrainingSession],
    records: &[PunchRecord],
) -> Vec<SessionProgress> {
    sessions
        .iter()
        .map(|s| {
            let subset: Vec<PunchRecord> =
                records.iter().filter(|r| r.session_id == s.id).cloned().collect();
            let agg = aggregate(&subset);
            SessionProgress {
                session_id: s.id,
                date: s.date,
                speed: agg.average_speed,
                force: agg.average_force,
                accuracy: agg.average_accuracy,
            }
        })
        .collect()
}

/// Grupper kombinasjoner på comboId, tell like sekvenser.
/// Sortert på frekvens (synkende), deretter første forekomst.
pub fn common_combos(records: &[PunchRecord]) -> Vec<ComboStat> {
    let mut order: Vec<&str> = Vec::new();
    let mut combos: HashMap<&str, Vec<&PunchRecord>> = HashMap::new();
    for r in records {
        if let Some(tag) = &r.combo {
            let id = tag.combo_id.as_str();
            if !combos.contains_key(id) {
                order.push(id);
            }
            combos.entry(id).or_default().push(r);
        }
    }

    struct Acc {
        first_seen: usize,
        frequency: usize,
        speed_sum: f64,
        force_sum: f64,
        punches: usize,
    }

    let mut seq_order: Vec<Vec<PunchType>> = Vec::new();
    let mut acc: HashMap<Vec<PunchType>, Acc> = HashMap::new();
    for id in order {
        let mut punches = combos.remove(id).unwrap_or_default();
        punches.sort_by_key(|r| r.combo.as_ref().map(|c| c.sequence).unwrap_or(0));
        let seq: Vec<PunchType> = punches.iter().map(|r| r.punch_type).collect();

        let next = seq_order.len();
        let e = acc.entry(seq.clone()).or_insert_with(|| Acc {
            first_seen: next,
            frequency: 0,
            speed_sum: 0.0,
            force_sum: 0.0,
            punches: 0,
        });
        if e.first_seen == next {
            seq_order.push(seq);
        }
        e.frequency += 1;
        for p in &punches {
            e.speed_sum += clean(Some(p.speed)).unwrap_or(0.0);
            e.force_sum += clean(Some(p.force)).unwrap_or(0.0);
            e.punches += 1;
        }
    }

    let mut out: Vec<(usize, ComboStat)> = seq_order
        .into_iter()
        .filter_map(|seq| {
            let a = acc.remove(&seq)?;
            let n = a.punches.max(1) as f64;
            Some((
                a.first_seen,
                ComboStat {
                    sequence: seq,
                    frequency: a.frequency,
                    average_speed: a.speed_sum / n,
                    average_force: a.force_sum / n,
                },
            ))
        })
        .collect();
    out.sort_by(|(ia, a), (ib, b)| b.frequency.cmp(&a.frequency).then(ia.cmp(ib)));
    out.into_iter().map(|(_, c)| c).collect()
}

fn recommendation(metric: MetricKind) -> &'static str {
    match metric {
        MetricKind::Speed => "Work on hand speed with shadow boxing and speed bag rounds",
        MetricKind::Force => "Drive from the hips and transfer weight through the punch",
        MetricKind::Accuracy => "Slow the punch down on the mitts until it lands clean",
    }
}

/// Svakeste slagtype per metrikk, når den ligger mer enn `WEAKNESS_MARGIN` under totalsnittet.
/// Krever minst to ulike slagtyper.
pub fn weaknesses<T: Measured + Clone>(records: &[T], policy: AveragingPolicy) -> Vec<Weakness> {
    let per_type = by_punch_type(records, policy);
    if per_type.len() < 2 {
        return Vec::new();
    }
    let overall = aggregate_with(records, policy);

    let pick = |m: &AggregateMetrics, kind: MetricKind| match kind {
        MetricKind::Speed => m.average_speed,
        MetricKind::Force => m.average_force,
        MetricKind::Accuracy => m.average_accuracy,
    };

    let mut out = Vec::new();
    for kind in [MetricKind::Speed, MetricKind::Force, MetricKind::Accuracy] {
        let reference = pick(&overall, kind);
        if reference <= 0.0 {
            continue;
        }
        let weakest = per_type
            .iter()
            .min_by_key(|b| OrderedFloat(pick(&b.metrics, kind)));
        if let Some(b) = weakest {
            let value = pick(&b.metrics, kind);
            if value < reference * (1.0 - WEAKNESS_MARGIN) {
                out.push(Weakness {
                    punch_type: b.punch_type,
                    metric: kind,
                    value,
                    recommendation: recommendation(kind).to_string(),
                });
            }
        }
    }
    out
}

fn base_metrics<T: Measured + Clone>(records: &[T], policy: AveragingPolicy) -> PunchMetrics {
    PunchMetrics {
        aggregate: aggregate_with(records, policy),
        punch_type_distribution: punch_type_distribution(records),
        by_punch_type: by_punch_type(records, policy),
        best: best_values(records),
        weaknesses: weaknesses(records, policy),
        ..PunchMetrics::default()
    }
}

/// Dashboard-metrikk for hentede slag; progresjon per dag.
pub fn fetched_metrics(records: &[FetchedPunch], policy: AveragingPolicy) -> PunchMetrics {
    let (speed_progression, force_progression) = daily_progression(records, policy);
    PunchMetrics {
        speed_progression,
        force_progression,
        ..base_metrics(records, policy)
    }
}

/// Coach-metrikk for registrerte slag; progresjon etter øktdato + vanlige kombinasjoner.
pub fn punch_metrics(records: &[PunchRecord], sessions: &[TrainingSession]) -> PunchMetrics {
    let progress = session_progression(sessions, records);
    let with_punches: Vec<&SessionProgress> = progress
        .iter()
        .filter(|p| records.iter().any(|r| r.session_id == p.session_id))
        .collect();

    PunchMetrics {
        speed_progression: with_punches
            .iter()
            .map(|p| ProgressPoint { date: p.date, value: p.speed })
            .collect(),
        force_progression: with_punches
            .iter()
            .map(|p| ProgressPoint { date: p.date, value: p.force })
            .collect(),
        common_combos: common_combos(records),
        ..base_metrics(records, AveragingPolicy::ZeroFill)
    }
}
