//! Off-thread density population with owning-context hand-off.
//!
//! Chunk generation splits into two phases. Phase one — populating a
//! chunk-private density buffer from noise — runs on the rayon pool with no
//! shared mutable state. Phase two — meshing and scene hand-off — must
//! happen on the single owning context, so finished volumes travel back
//! over a channel and the world drains it there. The channel is the one
//! transition point between the two contexts.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use glam::Vec3;
use web_time::Instant;

use crate::density::DensityField;
use crate::noise::NoiseSource;
use crate::types::{ChunkCoord, TerrainParams};

/// Work order for one chunk's density population.
#[derive(Clone, Copy, Debug)]
pub struct DensityJob {
  pub coords: ChunkCoord,
  pub origin: Vec3,
  pub size: usize,
  pub scale: f32,
  pub iso_level: f32,
  pub params: TerrainParams,
}

/// A populated density volume handed back from a worker.
pub struct DensityCompletion {
  pub coords: ChunkCoord,
  pub field: DensityField,
  /// Population time on the worker, for progress logs.
  pub elapsed_us: u64,
}

/// Fan-out of density jobs onto the rayon pool, drained on the owning
/// context.
pub struct GenerationQueue {
  tx: Sender<DensityCompletion>,
  rx: Receiver<DensityCompletion>,
}

impl Default for GenerationQueue {
  fn default() -> Self {
    Self::new()
  }
}

impl GenerationQueue {
  pub fn new() -> Self {
    let (tx, rx) = unbounded();
    Self { tx, rx }
  }

  /// Spawn one population job on the worker pool (non-blocking).
  ///
  /// The worker builds a fresh, chunk-private field; nothing it touches
  /// aliases live world state.
  pub fn spawn<N: NoiseSource + 'static>(&self, job: DensityJob, noise: Arc<N>) {
    let tx = self.tx.clone();

    rayon::spawn(move || {
      let started = Instant::now();

      let mut field = DensityField::new(job.size, job.scale, job.iso_level);
      field.populate(job.origin, &job.params, noise.as_ref());

      // The receiver only disappears when the world is gone; a failed send
      // just drops the volume.
      let _ = tx.send(DensityCompletion {
        coords: job.coords,
        field,
        elapsed_us: started.elapsed().as_micros() as u64,
      });
    });
  }

  /// Collect every finished volume without blocking.
  pub fn try_drain(&self) -> Vec<DensityCompletion> {
    self.rx.try_iter().collect()
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use glam::IVec3;

  use super::*;
  use crate::noise::PerlinNoise;

  fn drain_until(queue: &GenerationQueue, count: usize) -> Vec<DensityCompletion> {
    let mut completions = Vec::new();
    for _ in 0..5000 {
      completions.extend(queue.try_drain());
      if completions.len() >= count {
        break;
      }
      std::thread::sleep(Duration::from_millis(1));
    }
    completions
  }

  #[test]
  fn worker_population_matches_synchronous() {
    let queue = GenerationQueue::new();
    let noise = Arc::new(PerlinNoise::new(99));
    let job = DensityJob {
      coords: IVec3::new(1, 2, 0),
      origin: Vec3::new(7.0, 14.0, 0.0),
      size: 8,
      scale: 1.0,
      iso_level: 0.0,
      params: TerrainParams::default().with_noise_frequency(0.1),
    };

    queue.spawn(job, Arc::clone(&noise));
    let completions = drain_until(&queue, 1);
    assert_eq!(completions.len(), 1);

    let completion = &completions[0];
    assert_eq!(completion.coords, job.coords);
    assert!(completion.field.is_meshable());

    let mut reference = DensityField::new(job.size, job.scale, job.iso_level);
    reference.populate(job.origin, &job.params, noise.as_ref());
    assert_eq!(completion.field, reference);
  }

  #[test]
  fn jobs_complete_independently() {
    let queue = GenerationQueue::new();
    let noise = Arc::new(PerlinNoise::new(5));

    for x in 0..6 {
      let job = DensityJob {
        coords: IVec3::new(x, 0, 0),
        origin: Vec3::new(x as f32 * 7.0, 0.0, 0.0),
        size: 6,
        scale: 1.0,
        iso_level: 0.0,
        params: TerrainParams::default(),
      };
      queue.spawn(job, Arc::clone(&noise));
    }

    let completions = drain_until(&queue, 6);
    assert_eq!(completions.len(), 6);

    let mut seen: Vec<i32> = completions.iter().map(|c| c.coords.x).collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
  }
}
