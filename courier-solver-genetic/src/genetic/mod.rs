//! `GeneticBuilder` implementation.

use courier_core::{BuildError, FleetRegistry, RouteBuilder, Solution, Stop, prepare_stops};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::decode::{decode, fitness};
use crate::operators::{Chromosome, crossover, mutate};

/// Tuning knobs for [`GeneticBuilder`].
///
/// # Examples
/// ```
/// use courier_solver_genetic::GeneticConfig;
///
/// let config = GeneticConfig::default().with_generations(10).with_seed(7);
/// assert_eq!(config.generations, 10);
/// assert_eq!(config.population_size, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneticConfig {
    /// Number of generations to evolve.
    pub generations: usize,
    /// Chromosomes per generation.
    pub population_size: usize,
    /// Probability that a child undergoes a swap mutation.
    pub mutation_rate: f64,
    /// Seed for the run's random number generator.
    pub seed: u64,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            generations: 100,
            population_size: 20,
            mutation_rate: 0.2,
            seed: 0,
        }
    }
}

impl GeneticConfig {
    /// Replace the generation count.
    #[must_use]
    pub const fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Replace the population size.
    #[must_use]
    pub const fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    /// Replace the mutation probability. Values outside `[0, 1]` are
    /// clamped when the run starts; NaN disables mutation.
    #[must_use]
    pub const fn with_mutation_rate(mut self, mutation_rate: f64) -> Self {
        self.mutation_rate = mutation_rate;
        self
    }

    /// Replace the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn effective_mutation_rate(&self) -> f64 {
        if self.mutation_rate.is_nan() {
            0.0
        } else {
            self.mutation_rate.clamp(0.0, 1.0)
        }
    }

    const fn is_degenerate(&self) -> bool {
        self.generations == 0 || self.population_size == 0
    }
}

/// Result of a [`GeneticBuilder::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneticRun {
    /// Decoded routes of the fittest chromosome seen.
    pub solution: Solution,
    /// Fitness of [`Self::solution`].
    pub best_fitness: f64,
    /// Best fitness seen so far, recorded after each generation.
    ///
    /// Empty when no generations ran.
    pub history: Vec<f64>,
}

/// Evolves stop orderings and keeps the fittest one seen.
///
/// Each generation replaces the population wholesale with children of two
/// uniformly chosen parents (order crossover, then a swap mutation with
/// probability [`GeneticConfig::mutation_rate`]). Every chromosome is
/// decoded with [`decode`](crate::decode) and scored with
/// [`fitness`](crate::fitness); the best one across the initial population
/// and all generations is returned.
///
/// With zero generations, an empty population or no stops, the builder
/// decodes the input order directly.
///
/// # Examples
/// ```
/// use courier_core::{FleetRegistry, RouteBuilder, Stop};
/// use courier_solver_genetic::{GeneticBuilder, GeneticConfig};
///
/// let fleet = FleetRegistry::uniform(2, 2, 100.0)?;
/// let stops = vec![
///     Stop::new("a", 1.0, 0.0),
///     Stop::new("b", 0.0, 1.0),
///     Stop::new("c", -1.0, 0.0),
/// ];
/// let builder = GeneticBuilder::new(GeneticConfig::default().with_generations(5));
/// let solution = builder.build(&stops, &fleet)?;
/// assert_eq!(solution.delivered, 3);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct GeneticBuilder {
    config: GeneticConfig,
}

impl GeneticBuilder {
    /// Create a builder with `config`.
    #[must_use]
    pub const fn new(config: GeneticConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &GeneticConfig {
        &self.config
    }

    /// Evolve a solution and report its fitness history.
    ///
    /// # Errors
    /// Returns [`BuildError`] when a stop fails validation.
    pub fn run(&self, stops: &[Stop], fleet: &FleetRegistry) -> Result<GeneticRun, BuildError> {
        let prepared = prepare_stops(stops)?;
        let input_order: Chromosome = (0..prepared.len()).collect();

        if self.config.is_degenerate() || prepared.is_empty() {
            let solution = decode(&input_order, &prepared, fleet);
            log::debug!("ga: degenerate run, decoding input order");
            return Ok(GeneticRun {
                best_fitness: fitness(&solution),
                solution,
                history: Vec::new(),
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut population: Vec<Chromosome> = (0..self.config.population_size)
            .map(|_| {
                let mut chromosome = input_order.clone();
                chromosome.shuffle(&mut rng);
                chromosome
            })
            .collect();

        let mut champion = Champion::new(input_order);
        champion.consider(&population, &prepared, fleet);

        let mutation_rate = self.config.effective_mutation_rate();
        let mut history = Vec::with_capacity(self.config.generations);
        for generation in 0..self.config.generations {
            population = breed(&population, mutation_rate, &mut rng);
            champion.consider(&population, &prepared, fleet);
            history.push(champion.fitness);
            log::debug!(
                "ga: generation {generation} best fitness {:.2}",
                champion.fitness
            );
        }

        let solution = decode(&champion.chromosome, &prepared, fleet);
        log::info!(
            "ga: delivered {}/{} stops, total distance {:.2}",
            solution.delivered,
            prepared.len(),
            solution.total_distance
        );
        Ok(GeneticRun {
            best_fitness: fitness(&solution),
            solution,
            history,
        })
    }
}

impl RouteBuilder for GeneticBuilder {
    fn build(&self, stops: &[Stop], fleet: &FleetRegistry) -> Result<Solution, BuildError> {
        self.run(stops, fleet).map(|run| run.solution)
    }
}

/// Fittest chromosome seen so far.
struct Champion {
    chromosome: Chromosome,
    fitness: f64,
}

impl Champion {
    const fn new(chromosome: Chromosome) -> Self {
        Self {
            chromosome,
            fitness: f64::NEG_INFINITY,
        }
    }

    fn consider(&mut self, population: &[Chromosome], stops: &[Stop], fleet: &FleetRegistry) {
        for chromosome in population {
            let score = fitness(&decode(chromosome, stops, fleet));
            if score > self.fitness {
                self.fitness = score;
                self.chromosome.clone_from(chromosome);
            }
        }
    }
}

fn breed<R: Rng + ?Sized>(
    population: &[Chromosome],
    mutation_rate: f64,
    rng: &mut R,
) -> Vec<Chromosome> {
    (0..population.len())
        .map(|_| {
            let first = population.choose(rng).map_or(&[][..], Vec::as_slice);
            let second = population.choose(rng).map_or(&[][..], Vec::as_slice);
            let mut child = crossover(first, second, rng);
            if rng.gen_bool(mutation_rate) {
                mutate(&mut child, rng);
            }
            child
        })
        .collect()
}
