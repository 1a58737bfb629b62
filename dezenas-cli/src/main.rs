mod display;
mod export;
mod import;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use dezenas_core::analysis::{AnalysisOptions, analyze, expand_user_games};
use dezenas_core::config::{GenerationConfig, GenerationMode, Universe};
use dezenas_core::generator::{
    CancellationToken, Generator, ProgressDetail, ProgressEvent, ProgressSink,
};
use dezenas_core::models::{PrizeTable, Variant};

use crate::display::{display_analysis, display_games, display_generation_summary, display_presets};
use crate::import::{
    historical_draws, into_numbers, load_existing_games, load_number_rows, parse_delimiter,
    parse_number_list,
};

type NumberList = Vec<u8>;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Mode {
    #[default]
    Exhaustive,
    Random,
}

impl From<Mode> for GenerationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Exhaustive => GenerationMode::Exhaustive,
            Mode::Random => GenerationMode::Randomized,
        }
    }
}

#[derive(Parser)]
#[command(name = "dezenas", about = "Gerador de jogos com garantia e análise de sorteios")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Gerar jogos sem repetir grupos garantidos
    Generate {
        /// Jogo: quina, megasena ou lotofacil
        #[arg(short, long, default_value = "quina")]
        game: Variant,

        /// Total de dezenas do volante
        #[arg(long)]
        pool_size: Option<u8>,

        /// Dezenas por jogo
        #[arg(long)]
        draw_size: Option<u8>,

        /// Tamanho do grupo que não pode se repetir (0 desliga a regra)
        #[arg(long)]
        guaranteed: Option<u8>,

        /// Quantidade de jogos desejada
        #[arg(short, long, default_value = "100")]
        count: usize,

        /// Sortear N dezenas do volante como universo
        #[arg(long, conflicts_with = "numbers")]
        random_universe: Option<u8>,

        /// Universo fixo, ex: "1,5,12,33"
        #[arg(long, value_parser = parse_number_list)]
        numbers: Option<NumberList>,

        #[arg(short, long, value_enum, default_value = "exhaustive")]
        mode: Mode,

        /// Modo aleatório: segundos sem jogo novo antes de parar (0 = sem limite)
        #[arg(long, default_value = "30")]
        idle_secs: u64,

        /// CSV com jogos existentes para reaproveitar
        #[arg(long)]
        existing: Option<PathBuf>,

        /// Não reduzir o universo às dezenas dos jogos reaproveitados
        #[arg(long)]
        keep_universe: bool,

        /// Seed para a reprodutibilidade
        #[arg(long)]
        seed: Option<u64>,

        /// Interromper a geração após N segundos
        #[arg(long)]
        stop_after: Option<u64>,

        /// Arquivo CSV de saída
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, default_value = ";", value_parser = parse_delimiter)]
        delimiter: u8,
    },

    /// Conferir jogos contra sorteios passados
    Analyze {
        #[arg(short, long, default_value = "quina")]
        game: Variant,

        /// CSV com os jogos (linhas maiores que um jogo são desdobradas)
        #[arg(long)]
        games: PathBuf,

        /// CSV com os resultados dos sorteios
        #[arg(long)]
        history: PathBuf,

        /// Tabela de prêmios em JSON
        #[arg(long)]
        prizes: Option<PathBuf>,

        /// Valor de uma aposta simples
        #[arg(long)]
        bet_cost: Option<f64>,

        /// Listar os grupos repetidos entre os jogos
        #[arg(long)]
        list_repeated: bool,

        /// Exportar o relatório em JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Exportar o detalhamento por sorteio em CSV
        #[arg(long)]
        breakdown: Option<PathBuf>,

        #[arg(long, default_value = ";", value_parser = parse_delimiter)]
        delimiter: u8,
    },

    /// Mostrar os padrões de cada jogo
    Presets,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            game,
            pool_size,
            draw_size,
            guaranteed,
            count,
            random_universe,
            numbers,
            mode,
            idle_secs,
            existing,
            keep_universe,
            seed,
            stop_after,
            output,
            delimiter,
        } => {
            let mut config = GenerationConfig::preset(game);
            if let Some(p) = pool_size {
                config.pool_size = p;
                config.universe = Universe::Random { count: p };
            }
            if let Some(k) = draw_size {
                config.draw_size = k;
            }
            if let Some(g) = guaranteed {
                config.guaranteed = g;
            }
            if let Some(n) = random_universe {
                config.universe = Universe::Random { count: n };
            }
            if let Some(list) = numbers {
                config.universe = Universe::Fixed(list);
            }
            config.target = count;
            config.mode = mode.into();
            config.idle_timeout_secs = idle_secs;
            config.keep_universe = keep_universe;
            config.seed = seed;

            cmd_generate(config, existing, stop_after, output, delimiter)
        }
        Command::Analyze {
            game,
            games,
            history,
            prizes,
            bet_cost,
            list_repeated,
            json,
            breakdown,
            delimiter,
        } => cmd_analyze(AnalyzeArgs {
            variant: game,
            games,
            history,
            prizes,
            bet_cost,
            list_repeated,
            json,
            breakdown,
            delimiter,
        }),
        Command::Presets => {
            display_presets();
            Ok(())
        }
    }
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new(target: usize) -> Result<Self> {
        let bar = ProgressBar::new(target as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} jogos {msg}",
            )?
            .progress_chars("=> "),
        );
        Ok(Self { bar })
    }
}

impl ProgressSink for TerminalProgress {
    fn report(&mut self, event: &ProgressEvent) {
        self.bar.set_position(event.accepted as u64);
        let msg = match event.detail {
            ProgressDetail::Seeding { reused } => format!("({} reaproveitados)", reused),
            ProgressDetail::Exhaustive { total, .. } => {
                format!("({:.1}% de {} combinações)", event.percent().unwrap_or(0.0), total)
            }
            ProgressDetail::Randomized { attempts } => format!("({} tentativas)", attempts),
        };
        self.bar.set_message(msg);
    }
}

fn cmd_generate(
    config: GenerationConfig,
    existing: Option<PathBuf>,
    stop_after: Option<u64>,
    output: Option<PathBuf>,
    delimiter: u8,
) -> Result<()> {
    let existing_games = match &existing {
        Some(path) => {
            let rows = load_existing_games(path, delimiter)?;
            if rows.is_empty() {
                bail!("Nenhum jogo válido em {:?}", path);
            }
            println!("{} jogos lidos de {:?}", rows.len(), path);
            into_numbers(rows)
        }
        None => Vec::new(),
    };

    let generator = Generator::new(config.clone()).context("Configuração inválida")?;
    println!(
        "Gerando {} jogos de {} dezenas (garantia {}) a partir de {} dezenas...",
        config.target,
        config.draw_size,
        config.guaranteed,
        generator.universe().len()
    );

    let cancel = CancellationToken::new();
    if let Some(secs) = stop_after {
        let token = cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            token.cancel();
        });
    }

    let mut progress = TerminalProgress::new(config.target)?;
    let outcome = generator.run(&existing_games, &cancel, &mut progress)?;
    progress.bar.finish_and_clear();

    display_generation_summary(&outcome, &config);
    display_games(&outcome.games, 20);

    if outcome.games.is_empty() {
        return Ok(());
    }
    let path = output.unwrap_or_else(|| {
        PathBuf::from(export::default_games_filename(
            outcome.games.len(),
            config.draw_size,
            config.guaranteed,
        ))
    });
    export::save_games(&path, &outcome.games, delimiter)?;
    println!("Jogos salvos em {:?}", path);
    Ok(())
}

struct AnalyzeArgs {
    variant: Variant,
    games: PathBuf,
    history: PathBuf,
    prizes: Option<PathBuf>,
    bet_cost: Option<f64>,
    list_repeated: bool,
    json: Option<PathBuf>,
    breakdown: Option<PathBuf>,
    delimiter: u8,
}

fn load_prizes(path: Option<&PathBuf>, variant: Variant) -> Result<PrizeTable> {
    let Some(path) = path else {
        return Ok(PrizeTable::defaults(variant));
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Não foi possível ler {:?}", path))?;
    let prizes: PrizeTable = serde_json::from_str(&json)
        .with_context(|| format!("Tabela de prêmios inválida: {:?}", path))?;
    Ok(prizes)
}

fn cmd_analyze(args: AnalyzeArgs) -> Result<()> {
    let variant = args.variant;
    let pool_size = variant.pool_size();

    let user_rows = load_number_rows(&args.games, args.delimiter, pool_size)?;
    let games = expand_user_games(&into_numbers(user_rows), variant)?;

    let history_rows = load_number_rows(&args.history, args.delimiter, pool_size)?;
    let import = historical_draws(history_rows, variant.draw_size() as usize);
    if import.skipped > 0 {
        log::warn!("{} linhas do histórico ignoradas", import.skipped);
    }

    let mut prizes = load_prizes(args.prizes.as_ref(), variant)?;
    if let Some(cost) = args.bet_cost {
        prizes.bet_cost = cost;
    }

    let options = AnalysisOptions {
        list_repeated: args.list_repeated,
    };
    let report = analyze(&games, &import.draws, variant, &prizes, options)?;
    display_analysis(&report);

    if let Some(path) = &args.json {
        export::save_report_json(path, &report)?;
        println!("Relatório salvo em {:?}", path);
    }
    if let Some(path) = &args.breakdown {
        export::save_breakdown(path, &report, args.delimiter)?;
        println!("Detalhamento salvo em {:?}", path);
    }
    Ok(())
}
