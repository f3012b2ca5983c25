use poolchem_core::config::LayoutConfig;
use poolchem_core::guidance::{Assessment, Guidance};
use poolchem_core::model::{MeasurementType, MethodRules, SanitationMethod};
use poolchem_core::rules::schema::PoolDocument;
use poolchem_core::submissions::dashboard::Page;
use poolchem_core::submissions::Submission;
use poolchem_core::training::TrainingSignup;

pub fn print_pool_list(pools: &[PoolDocument]) {
    if pools.is_empty() {
        println!("No pools stored yet.");
        return;
    }

    let width = pools.iter().map(|p| p.id.len()).max().unwrap_or(2).max(2);
    println!("  {:<width$}  {:<5}  {:<24}  Markets", "Id", "Pools", "Name");
    println!("  {}", "-".repeat(width + 45));
    for pool in pools {
        let markets: Vec<&str> = pool.markets.iter().map(String::as_str).collect();
        println!(
            "  {:<width$}  {:<5}  {:<24}  {}",
            pool.id,
            pool.num_pools,
            pool.name,
            markets.join(", ")
        );
    }
}

pub fn print_pool(pool: &PoolDocument, layout: &LayoutConfig) {
    let markets: Vec<&str> = pool.markets.iter().map(String::as_str).collect();
    println!("  Name:    {}", pool.name);
    if !pool.id.is_empty() {
        println!("  Id:      {}", pool.id);
    }
    println!("  Pools:   {}", pool.num_pools);
    println!("  Markets: {}\n", markets.join(", "));

    for (slot, set) in pool.rule_sets().iter().enumerate() {
        for method in SanitationMethod::ALL {
            println!("=== Pool {} / {} ===\n", slot + 1, method);
            print_method(set.method(method), layout);
        }
    }

    let missing = pool.num_pools.saturating_sub(pool.rules.pools.len());
    if missing > 0 {
        println!("  ({missing} pool(s) without rules)\n");
    }
}

fn print_method(rules: &MethodRules, layout: &LayoutConfig) {
    if rules.is_empty() {
        println!("  (no rules)\n");
        return;
    }

    for measurement in MeasurementType::ALL {
        let entries = rules.get(measurement);
        let mut keys: Vec<&String> = layout
            .keys(measurement)
            .iter()
            .filter(|k| entries.contains_key(*k))
            .collect();
        keys.extend(entries.keys().filter(|k| !layout.keys(measurement).contains(*k)));

        if keys.is_empty() {
            continue;
        }
        println!("  {}", measurement);
        for key in keys {
            let entry = &entries[key];
            println!(
                "    {:<8}  {:<6}  {}",
                key,
                entry.concern_level.as_str(),
                entry.response
            );
        }
    }
    println!();
}

fn print_guidance(measurement: MeasurementType, value: &str, guidance: Option<&Guidance>) {
    match guidance {
        Some(g) => println!(
            "  {:<8} {:<6} [{}] {}  ({})",
            measurement.to_string(),
            value,
            g.value_key,
            g.entry.response,
            g.entry.concern_level
        ),
        None => println!(
            "  {:<8} {:<6} no rule covers this reading",
            measurement.to_string(),
            value
        ),
    }
}

pub fn print_assessment(submission: &Submission, assessment: &Assessment) {
    println!(
        "Recorded {} for {} pool {} ({})\n",
        submission.id,
        submission.pool,
        submission.slot + 1,
        submission.method
    );
    print_guidance(
        MeasurementType::Ph,
        &submission.ph.to_string(),
        assessment.ph.as_ref(),
    );
    print_guidance(
        MeasurementType::Cl,
        &submission.cl.to_string(),
        assessment.cl.as_ref(),
    );
    println!("\n  Overall concern: {}", assessment.concern);
}

pub fn print_submissions(page: &Page<'_>) {
    if page.rows.is_empty() {
        println!("No readings match.");
        return;
    }

    println!(
        "  {:<12}  {:<20}  {:<16}  {:<4}  {:<5}  {:<5}  {:<6}  Staff",
        "Id", "Submitted", "Pool", "No.", "pH", "Cl", "Concern"
    );
    println!("  {}", "-".repeat(90));
    for s in &page.rows {
        println!(
            "  {:<12}  {:<20}  {:<16}  {:<4}  {:<5}  {:<5}  {:<6}  {}",
            s.id,
            s.submitted_at.format("%Y-%m-%d %H:%M").to_string(),
            s.pool,
            s.slot + 1,
            s.ph.to_string(),
            s.cl.to_string(),
            s.concern.as_str(),
            s.staff
        );
    }
    println!(
        "\n  Page {} of {} ({} reading(s))",
        page.index + 1,
        page.total_pages,
        page.total_rows
    );
}

pub fn print_signups(signups: &[TrainingSignup]) {
    if signups.is_empty() {
        println!("No training signups.");
        return;
    }
    for s in signups {
        println!(
            "  {:<14}  {:<20}  {:<28}  {:<8}  {}",
            s.id, s.name, s.email, s.market, s.session
        );
    }
}
