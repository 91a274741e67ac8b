use eui_explorer::{
    aggregate, report, AggregateOptions, BuildingRecord, Dimension, DisplayConfig, Layout,
    PeerRank, RowId, TableLoader,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "eui-explorer", about = "Building energy use intensity explorer")]
struct Opt {
    /// Path to the processed bills file (.csv, .csv.gz or .csv.bz2)
    #[structopt(long)]
    path: Option<String>,
    /// Field delimiter
    #[structopt(short, long)]
    delimiter: Option<char>,
    /// Selection axis: "cz" or "building_type"
    #[structopt(short, long, default_value = "cz")]
    by: String,
    /// Selection values on the selection axis, not allowed with --overview
    #[structopt(short, long)]
    select: Vec<String>,
    /// Summary metric
    #[structopt(short, long, default_value = "EUI_tot_avg_2009_2015")]
    metric: String,
    /// Groups must have more buildings than this
    #[structopt(long, default_value = "5")]
    min_sample_size: usize,
    /// Aggregates every selection value of the selection axis
    #[structopt(long, conflicts_with = "select")]
    overview: bool,
    /// Row of a building to rank against its peers
    #[structopt(long)]
    building: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut loader = TableLoader::default();
    if let Some(arg) = opt.path {
        loader = loader.data_path(arg);
    }
    if let Some(arg) = opt.delimiter {
        loader = loader.delimiter(u8::try_from(arg)?);
    }
    let table = loader.load()?;

    let config = DisplayConfig::default();
    let by = Dimension::new(&opt.by)?;
    let mut options = AggregateOptions::default().min_sample_size(opt.min_sample_size);
    if let Some(order) = config.group_order(by) {
        options = options.order(order);
    }

    if opt.overview {
        for (selection, groups) in report::overview(&table, by, &opt.metric, &options)? {
            println!("{} {}:", by, selection);
            println!("{}", groups);
        }
    } else {
        if !opt.select.is_empty() {
            options = options.select(opt.select);
        }
        let groups = aggregate(&table, by, &opt.metric, &options)?;
        if groups.is_empty() {
            println!("No group with more than {} buildings", opt.min_sample_size);
        } else {
            if let Some(label) = &groups.axis_label {
                println!("{}", label.replace('\n', " "));
            }
            println!("{}", groups);
        }
    }

    if let Some(row) = opt.building {
        let layout = Layout::default();
        let building = BuildingRecord::new(&table, &layout, RowId(row))?;
        println!(
            "Building {}: {} ({}, CZ {})",
            building.id(),
            building.address()?.unwrap_or_default(),
            building.building_type()?.unwrap_or_default(),
            building.climate_zone()?.unwrap_or_default()
        );
        for trace in building.time_trace(&[]) {
            let n_missing = trace.points.iter().filter(|(_, v)| v.is_none()).count();
            println!(
                " - {:<12}: {} months ({} missing)",
                config.fuel_label(trace.fuel),
                trace.len(),
                n_missing
            );
        }
        match building.peer_rank(&opt.metric)? {
            PeerRank::Ranked(standing) => println!(
                " - {}: {:.3}, percentile {:.1} among {} peers (mean {:.3})",
                opt.metric,
                standing.score,
                standing.percentile,
                standing.peers.len(),
                standing.peer_mean
            ),
            PeerRank::EmptyPeerGroup => println!(" - {}: no peer to compare with", opt.metric),
            PeerRank::MissingScore => println!(" - {}: no value", opt.metric),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_rejects_selection() {
        let args = ["eui-explorer", "--overview", "--select", "3"];
        assert!(Opt::from_iter_safe(args).is_err());
        let opt = Opt::from_iter_safe(["eui-explorer", "--overview"]).unwrap();
        assert!(opt.overview && opt.select.is_empty());
        let opt = Opt::from_iter_safe(["eui-explorer", "-s", "3", "-s", "9"]).unwrap();
        assert_eq!(opt.select, vec!["3", "9"]);
    }
}
