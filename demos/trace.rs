use std::collections::{BTreeMap, VecDeque};

use fitalloc::{Allocator, Handle, SearchMode};
use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Positive entries allocate that many units, negative entries free the oldest
/// live allocation of that size.
const TRACE: [i64; 11] = [10, 5, 20, -5, 12, -10, 8, 6, 7, 3, 10];

/// One allocator per search mode, plus the live handles grouped by size so a
/// negative trace entry knows what to free.
struct Run {
  allocator: Allocator,
  by_size: BTreeMap<usize, VecDeque<Handle>>,
}

impl Run {
  fn new(mode: SearchMode) -> Self {
    Self {
      allocator: Allocator::new(100, mode),
      by_size: BTreeMap::new(),
    }
  }

  fn step(
    &mut self,
    request: i64,
  ) -> String {
    let size = request.unsigned_abs() as usize;

    if request > 0 {
      match self.allocator.allocate(size, None) {
        Ok(Some(allocation)) => {
          self.by_size.entry(size).or_default().push_back(allocation.handle);
          format!("{} @ {}", allocation.handle, allocation.address())
        }
        Ok(None) => "no fit".to_owned(),
        Err(err) => format!("rejected: {err}"),
      }
    } else {
      let Some(handle) = self.by_size.get_mut(&size).and_then(|handles| handles.pop_front()) else {
        return format!("nothing of size {size} to free");
      };

      match self.allocator.free(handle) {
        Ok(extent) => format!("freed {handle} {extent}"),
        Err(err) => format!("rejected: {err}"),
      }
    }
  }
}

fn main() {
  // Trace shows every placement, split and merge the allocators make.
  SimpleLogger::new()
    .with_level(LevelFilter::Trace)
    .init()
    .unwrap();

  // Modes come from the command line (`best`, `next-fit`, ...); all of them
  // run when none are given.
  let modes: Vec<SearchMode> = match std::env::args()
    .skip(1)
    .map(|arg| arg.parse::<SearchMode>())
    .collect::<Result<Vec<_>, _>>()
  {
    Ok(modes) if !modes.is_empty() => modes,
    Ok(_) => SearchMode::ALL.to_vec(),
    Err(err) => {
      eprintln!("{err}");
      std::process::exit(2);
    }
  };

  let mut runs: Vec<(SearchMode, Run)> = modes.iter().map(|&mode| (mode, Run::new(mode))).collect();

  println!("Trace: {TRACE:?}");

  // --------------------------------------------------------------------
  // Replay the trace on every allocator side by side.
  // --------------------------------------------------------------------
  for (step, &request) in TRACE.iter().enumerate() {
    println!("\nStep {:2}: request {request}", step + 1);

    for (mode, run) in &mut runs {
      let outcome = run.step(request);
      println!("  {:10} {:28} {}", mode.name(), outcome, run.allocator.free_list());
    }
  }

  // --------------------------------------------------------------------
  // Where each strategy ended up.
  // --------------------------------------------------------------------
  println!("\nSummary:");
  for (mode, run) in &runs {
    let stats = run.allocator.stats();
    println!("  {:10} {stats}", mode.name());

    if let Err(err) = run.allocator.verify() {
      eprintln!("  {:10} invariant broken: {err}", mode.name());
    }
  }
}
