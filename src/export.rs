//! Data export for analysis in external tools.

use crate::audit::AuditLog;
use crate::stats::StatsHistory;
use crate::world::World;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Result, Write};
use std::path::{Path, PathBuf};

/// Export the model time series to CSV
pub fn export_stats_csv<P: AsRef<Path>>(history: &StatsHistory, path: P) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(
        file,
        "step,selfish,altruist,void,population,percentage_altruist,running"
    )?;

    for s in &history.snapshots {
        writeln!(
            file,
            "{},{},{},{},{},{:.6},{}",
            s.step, s.n_selfish, s.n_altruist, s.n_void, s.population, s.percentage_of_altruist, s.running,
        )?;
    }

    file.flush()
}

const FITNESS_HEADER: &str = "step,x,y,strategy,fitness";
const LOTTERY_HEADER: &str = "step,x,y,strategy,p_selfish,p_altruist,p_void";

fn write_fitness_rows<W: Write>(out: &mut W, audit: &AuditLog) -> Result<()> {
    for r in &audit.fitness {
        writeln!(out, "{},{},{},{},{:.6}", r.step, r.x, r.y, r.strategy, r.fitness)?;
    }
    Ok(())
}

fn write_lottery_rows<W: Write>(out: &mut W, audit: &AuditLog) -> Result<()> {
    for r in &audit.lottery {
        writeln!(
            out,
            "{},{},{},{},{:.6},{:.6},{:.6}",
            r.step, r.x, r.y, r.strategy, r.p_selfish, r.p_altruist, r.p_void,
        )?;
    }
    Ok(())
}

/// Export the fitness table to CSV
pub fn export_fitness_csv<P: AsRef<Path>>(audit: &AuditLog, path: P) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "{}", FITNESS_HEADER)?;
    write_fitness_rows(&mut file, audit)?;

    file.flush()
}

/// Export the lottery table to CSV
pub fn export_lottery_csv<P: AsRef<Path>>(audit: &AuditLog, path: P) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "{}", LOTTERY_HEADER)?;
    write_lottery_rows(&mut file, audit)?;

    file.flush()
}

fn open_table(path: &Path, header: &str, append: bool) -> Result<BufWriter<File>> {
    let file = if append {
        OpenOptions::new().create(true).append(true).open(path)?
    } else {
        File::create(path)?
    };
    let needs_header = file.metadata()?.len() == 0;

    let mut out = BufWriter::new(file);
    if needs_header {
        writeln!(out, "{}", header)?;
    }
    Ok(out)
}

/// Streams audit tables to `fitness.csv` and `lottery.csv` as a run goes,
/// so rows can be drained from the world after every step.
pub struct TableWriter {
    fitness: BufWriter<File>,
    lottery: BufWriter<File>,
    pub fitness_file: PathBuf,
    pub lottery_file: PathBuf,
}

impl TableWriter {
    /// Create both files in `base`, replacing old ones, and write their headers
    pub fn create<P: AsRef<Path>>(base: P) -> Result<Self> {
        Self::open(base.as_ref(), false)
    }

    /// Continue tables left by an earlier run in `base`. Missing or empty
    /// files start with a header.
    pub fn append_to<P: AsRef<Path>>(base: P) -> Result<Self> {
        Self::open(base.as_ref(), true)
    }

    fn open(base: &Path, append: bool) -> Result<Self> {
        std::fs::create_dir_all(base)?;

        let fitness_file = base.join("fitness.csv");
        let lottery_file = base.join("lottery.csv");
        let fitness = open_table(&fitness_file, FITNESS_HEADER, append)?;
        let lottery = open_table(&lottery_file, LOTTERY_HEADER, append)?;

        Ok(Self {
            fitness,
            lottery,
            fitness_file,
            lottery_file,
        })
    }

    /// Append every row in `audit`
    pub fn append(&mut self, audit: &AuditLog) -> Result<()> {
        write_fitness_rows(&mut self.fitness, audit)?;
        write_lottery_rows(&mut self.lottery, audit)
    }

    /// Flush both files
    pub fn finish(mut self) -> Result<(PathBuf, PathBuf)> {
        self.fitness.flush()?;
        self.lottery.flush()?;
        Ok((self.fitness_file, self.lottery_file))
    }
}

/// Export the current grid and model state to JSON
pub fn export_grid_json<P: AsRef<Path>>(world: &World, path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(&world.snapshot())?;
    std::fs::write(path, json)
}

/// Files written by [`export_run`]
#[derive(Debug)]
pub struct ExportManifest {
    pub step: u64,
    pub stats_file: PathBuf,
    pub grid_file: PathBuf,
    pub fitness_file: Option<PathBuf>,
    pub lottery_file: Option<PathBuf>,
}

/// Export everything for a run into `base`. Audit tables are written only
/// when rows were recorded.
pub fn export_run<P: AsRef<Path>>(world: &World, base: P) -> Result<ExportManifest> {
    let base = base.as_ref();
    std::fs::create_dir_all(base)?;

    let stats_file = base.join("stats.csv");
    let grid_file = base.join("grid.json");
    export_stats_csv(&world.stats_history, &stats_file)?;
    export_grid_json(world, &grid_file)?;

    let audit = world.audit();
    let (fitness_file, lottery_file) = if audit.is_empty() {
        (None, None)
    } else {
        let fitness_file = base.join("fitness.csv");
        let lottery_file = base.join("lottery.csv");
        export_fitness_csv(audit, &fitness_file)?;
        export_lottery_csv(audit, &lottery_file)?;
        (Some(fitness_file), Some(lottery_file))
    };

    Ok(ExportManifest {
        step: world.time(),
        stats_file,
        grid_file,
        fitness_file,
        lottery_file,
    })
}
