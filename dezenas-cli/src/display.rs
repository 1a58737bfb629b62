use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use dezenas_core::analysis::AnalysisReport;
use dezenas_core::config::GenerationConfig;
use dezenas_core::generator::{GenerationOutcome, GenerationStatus};
use dezenas_core::models::{Game, PrizeTable, Variant};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn money(value: f64) -> String {
    format!("R$ {:.2}", value)
}

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:02}", n))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn display_games(games: &[Game], limit: usize) {
    if games.is_empty() {
        println!("Nenhum jogo gerado.");
        return;
    }

    let mut table = new_table(vec!["#", "Dezenas"]);
    for (i, game) in games.iter().take(limit).enumerate() {
        table.add_row(vec![(i + 1).to_string(), game.to_string()]);
    }
    println!("{table}");
    if games.len() > limit {
        println!("... e mais {} jogos", games.len() - limit);
    }
}

pub fn display_generation_summary(outcome: &GenerationOutcome, config: &GenerationConfig) {
    let status_color = match outcome.status {
        GenerationStatus::Complete => Color::Green,
        GenerationStatus::Stopped => Color::Yellow,
        GenerationStatus::Exhausted(_) => Color::Red,
    };

    let mut table = new_table(vec!["Item", "Valor"]);
    table.add_row(vec![
        Cell::new("Situação"),
        Cell::new(outcome.status.to_string()).fg(status_color),
    ]);
    table.add_row(vec![
        "Jogos".to_string(),
        format!("{} de {}", outcome.games.len(), outcome.target),
    ]);
    table.add_row(vec!["Reaproveitados".to_string(), outcome.reused.to_string()]);
    table.add_row(vec!["Novos".to_string(), outcome.generated().to_string()]);
    table.add_row(vec![
        "Dezenas por jogo / garantia".to_string(),
        format!("{} / {}", config.draw_size, config.guaranteed),
    ]);
    table.add_row(vec!["Modo".to_string(), config.mode.to_string()]);
    table.add_row(vec![
        format!("Universo ({} dezenas)", outcome.working_pool.len()),
        join_numbers(&outcome.working_pool),
    ]);
    table.add_row(vec!["Combinações testadas".to_string(), outcome.evaluated.to_string()]);
    table.add_row(vec![
        "Tempo".to_string(),
        format!("{:.1} s", outcome.elapsed.as_secs_f64()),
    ]);
    println!("{table}");

    if outcome.shortfall() > 0 {
        println!(
            "Atenção: faltaram {} jogos para a meta ({}).",
            outcome.shortfall(),
            outcome.status
        );
    }
}

pub fn display_analysis(report: &AnalysisReport) {
    println!(
        "\nAnálise {}: {} jogos contra {} sorteios\n",
        report.variant, report.user_games, report.draws
    );
    println!(
        "Dezenas usadas ({}): {}\n",
        report.numbers_used.len(),
        join_numbers(&report.numbers_used)
    );

    let mut table = new_table(vec![
        "Faixa", "Prêmio", "Acertos", "Média/sorteio", "Mín", "Máx", "Sorteios sem acerto",
    ]);
    for tier in &report.tiers {
        table.add_row(vec![
            format!("{} ({})", tier.tier.name, tier.tier.matches),
            money(tier.prize),
            tier.total_hits.to_string(),
            format!("{:.3}", tier.mean_hits(report.draws)),
            tier.min_hits.to_string(),
            tier.max_hits.to_string(),
            tier.draws_without_hits.to_string(),
        ]);
    }
    println!("{table}");

    let mut table = new_table(vec!["Resumo", "Valor"]);
    table.add_row(vec!["Custo por sorteio".to_string(), money(report.cost_per_draw)]);
    table.add_row(vec!["Prêmio total".to_string(), money(report.total_prize)]);
    table.add_row(vec!["Prêmio médio por sorteio".to_string(), money(report.mean_prize)]);
    table.add_row(vec![
        "Prêmio médio sem faixa principal".to_string(),
        money(report.mean_prize_excluding_top),
    ]);
    let roi_color = if report.roi >= 1.0 { Color::Green } else { Color::Red };
    table.add_row(vec![
        Cell::new("Retorno (ROI)"),
        Cell::new(format!("{:.2}%", report.roi * 100.0)).fg(roi_color),
    ]);
    table.add_row(vec![
        "Retorno sem faixa principal".to_string(),
        format!("{:.2}%", report.roi_excluding_top * 100.0),
    ]);
    println!("{table}");

    println!("\nPrêmio do sorteio em relação ao custo");
    let mut table = new_table(vec!["Faixa de retorno", "Sorteios", "%"]);
    for bucket in &report.cost_ratio {
        table.add_row(vec![
            bucket.label(),
            bucket.draws.to_string(),
            format!("{:.2}%", bucket.share * 100.0),
        ]);
    }
    println!("{table}");

    display_hit_frequency(report);
    display_repetition(report);
}

fn display_hit_frequency(report: &AnalysisReport) {
    println!("\nFrequência de acertos por sorteio");
    let mut table = new_table(vec!["Faixa", "Acertos no sorteio", "Sorteios"]);
    for tier in &report.tiers {
        for (hits, draws) in &tier.hit_frequency {
            table.add_row(vec![
                tier.tier.name.to_string(),
                hits.to_string(),
                draws.to_string(),
            ]);
        }
    }
    println!("{table}");
}

fn display_repetition(report: &AnalysisReport) {
    println!("\nRepetições entre os próprios jogos");
    let mut table = new_table(vec!["Grupo", "Dezenas", "Grupos repetidos"]);
    for summary in &report.repetition {
        table.add_row(vec![
            summary.name.to_string(),
            summary.size.to_string(),
            summary.distinct_repeated.to_string(),
        ]);
    }
    println!("{table}");

    for summary in report.repetition.iter().filter(|s| !s.subsets.is_empty()) {
        println!("\n{} repetidos ({}):", summary.name, summary.subsets.len());
        for subset in &summary.subsets {
            println!("  {} -> {}x", subset.label(), subset.count);
        }
    }
}

pub fn display_presets() {
    let mut table = new_table(vec!["Jogo", "Dezenas", "Por jogo", "Garantia", "Aposta"]);
    for variant in Variant::ALL {
        let prizes = PrizeTable::defaults(variant);
        table.add_row(vec![
            variant.name().to_string(),
            variant.pool_size().to_string(),
            variant.draw_size().to_string(),
            variant.default_guaranteed().to_string(),
            money(prizes.bet_cost),
        ]);
    }
    println!("{table}");

    for variant in Variant::ALL {
        let prizes = PrizeTable::defaults(variant);
        println!("\n{}", variant.name());
        let mut table = new_table(vec!["Faixa", "Acertos", "Prêmio"]);
        for tier in variant.tiers() {
            table.add_row(vec![
                tier.name.to_string(),
                tier.matches.to_string(),
                money(prizes.value_for(tier.matches)),
            ]);
        }
        println!("{table}");
    }
}
