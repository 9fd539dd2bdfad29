use std::fmt::Write;

use crate::types::PunchMetrics;

/// Tekstversjon av metrikk-kortene (én desimal + enhet).
pub fn render_summary(m: &PunchMetrics) -> String {
    let mut out = String::new();
    let a = &m.aggregate;
    let _ = writeln!(out, "--- Punch Analysis ---");
    let _ = writeln!(out, "Average Speed: {:.1} m/s", a.average_speed);
    let _ = writeln!(out, "Average Force: {:.1} N", a.average_force);
    let _ = writeln!(out, "Average Accuracy: {:.1} %", a.average_accuracy);
    let _ = writeln!(out, "Total Punches: {}", a.total_punches);

    if a.total_punches > 0 {
        let _ = writeln!(out, "Best Speed: {:.1} m/s", m.best.best_speed);
        let _ = writeln!(out, "Best Force: {:.1} N", m.best.best_force);
        let _ = writeln!(out, "Best Accuracy: {:.1} %", m.best.best_accuracy);
    }

    for (t, n) in &m.punch_type_distribution {
        let _ = writeln!(out, "{}: {}", t.label(), n);
    }
    for w in &m.weaknesses {
        let _ = writeln!(out, "Weak {:?} on {}: {}", w.metric, w.punch_type.label(), w.recommendation);
    }
    out
}
