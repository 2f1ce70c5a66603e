use board_optimizer::inventory::Inventory;
use board_optimizer::render;
use board_optimizer::solver::Optimizer;
use board_optimizer::types::{
    CutRequirement, Objective, OptimizationConfig, format_units, to_milli,
};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "board_optimizer",
    about = "Allocates rectangular cuts onto stock boards, minimizing waste or cost"
)]
struct Cli {
    /// Stock boards as LxWxD[:qty] (e.g. 96x12x0.75:4)
    #[arg(long = "boards", num_args = 1..)]
    boards: Vec<String>,

    /// Required cuts as LxW[:qty] (e.g. 24.5x6:3 18x4:5)
    #[arg(long = "cuts", num_args = 1..)]
    cuts: Vec<String>,

    /// Optimization objective: waste or cost
    #[arg(long, default_value = "waste", value_parser = parse_objective)]
    objective: Objective,

    /// Cost per board foot
    #[arg(long, default_value_t = 1.0)]
    rate: f64,

    /// Disable 90-degree cut rotation
    #[arg(long)]
    no_rotate: bool,

    /// Show ASCII layout of each used board
    #[arg(long)]
    layout: bool,
}

fn parse_objective(s: &str) -> Result<Objective, String> {
    match s {
        "waste" => Ok(Objective::Waste),
        "cost" => Ok(Objective::Cost),
        _ => Err(format!("invalid objective '{}', expected: waste or cost", s)),
    }
}

/// Parses "24.5x6" style dimension lists into milliunits, requiring each
/// component to be a positive number.
fn parse_dims<const N: usize>(s: &str) -> Result<[u32; N], String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != N {
        return Err(format!(
            "invalid dimensions '{}', expected {} components separated by 'x'",
            s, N
        ));
    }
    let mut dims = [0u32; N];
    for (slot, part) in dims.iter_mut().zip(&parts) {
        let value = part
            .parse::<f64>()
            .map_err(|_| format!("invalid number '{}' in '{}'", part, s))?;
        *slot = to_milli(value).map_err(|e| format!("{e} in '{s}'"))?;
        if *slot == 0 {
            return Err(format!("dimensions must be positive in '{}'", s));
        }
    }
    Ok(dims)
}

fn split_qty(s: &str) -> Result<(&str, u32), String> {
    match s.split_once(':') {
        None => Ok((s, 1)),
        Some((dims, qty)) => {
            let qty = qty
                .parse::<u32>()
                .map_err(|_| format!("invalid quantity in '{}'", s))?;
            if qty == 0 {
                return Err(format!("quantity must be non-zero in '{}'", s));
            }
            Ok((dims, qty))
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let inventory = Inventory::new();
    for spec in &cli.boards {
        let (dims, qty) = split_qty(spec).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        let [length, width, depth] = parse_dims::<3>(dims).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        for _ in 0..qty {
            inventory.add(length, width, depth);
        }
    }

    let mut cuts: Vec<CutRequirement> = Vec::new();
    for spec in &cli.cuts {
        let (dims, qty) = split_qty(spec).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        let [length, width] = parse_dims::<2>(dims).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        for _ in 0..qty {
            cuts.push(CutRequirement::new(cuts.len(), length, width));
        }
    }

    let config = OptimizationConfig {
        optimize_for: cli.objective,
        allow_rotation: !cli.no_rotate,
    };
    let boards = inventory.snapshot(cli.rate);
    let result = Optimizer::new(boards, cuts, config).run();

    for plan in &result.board_plans {
        println!(
            "Board {} ({}): {:.1}% waste",
            plan.board_id,
            plan.board_rect(),
            plan.waste_percentage
        );
        for p in &plan.placements {
            let rot = if p.rotated { " [rotated]" } else { "" };
            println!(
                "  cut {}: {} @ ({}, {}){}",
                p.cut_id,
                p.rect(),
                format_units(p.x),
                format_units(p.y),
                rot
            );
        }
        if cli.layout {
            print!("{}", render::render_board(plan.board_rect(), &plan.placements));
        }
        println!();
    }

    if !result.unplaced_cuts.is_empty() {
        println!("Unplaced cuts:");
        for cut in &result.unplaced_cuts {
            println!("  cut {}: {}", cut.id, cut.rect());
        }
        println!();
    }

    println!(
        "Summary: {} board{} used, total cost {:.2}, {:.1}% waste",
        result.boards_used(),
        if result.boards_used() == 1 { "" } else { "s" },
        result.total_cost,
        result.total_waste_percentage,
    );
}
