//! Small elitist genetic algorithm shared by every optimization pass.
//!
//! Each generation the population is ranked, the two fittest genes survive
//! unchanged, and every other slot is refilled with a mutated child of those
//! two. The random source is borrowed for the engine's lifetime and is the
//! only source of nondeterminism.

use std::error::Error;
use std::fmt;

use rand_chacha::rand_core::Rng;
use serde::{Deserialize, Serialize};

use crate::random;

type Mutator<'a, T, R> = Box<dyn Fn(&mut R, Vec<T>) -> Vec<T> + 'a>;
type Breeder<'a, T, R> = Box<dyn Fn(&mut R, &[T], &[T]) -> Vec<T> + 'a>;
type Fitness<'a, T> = Box<dyn Fn(&[T]) -> f64 + 'a>;

/// A gene paired with the fitness it scored.
#[derive(Clone, Debug, PartialEq)]
pub struct Scored<T> {
    pub gene: Vec<T>,
    pub fitness: f64,
}

/// Read-only view of a ranked population, handed to observers between generations.
#[derive(Debug)]
pub struct Generation<'p, T> {
    pub index: usize,
    /// Sorted fittest first.
    pub population: &'p [Scored<T>],
}

impl<T> Generation<'_, T> {
    pub fn best(&self) -> &Scored<T> {
        &self.population[0]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvolutionError {
    EmptyPopulation,
}

impl fmt::Display for EvolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPopulation => write!(f, "initial population is empty"),
        }
    }
}

impl Error for EvolutionError {}

pub struct GeneticAlgorithm<'a, T, R: ?Sized> {
    mutator: Mutator<'a, T, R>,
    breeder: Breeder<'a, T, R>,
    fitness: Fitness<'a, T>,
    initial: Vec<Vec<T>>,
    rng: &'a mut R,
}

impl<'a, T: Clone, R: Rng + ?Sized> GeneticAlgorithm<'a, T, R> {
    pub fn new(
        initial: Vec<Vec<T>>,
        mutator: impl Fn(&mut R, Vec<T>) -> Vec<T> + 'a,
        breeder: impl Fn(&mut R, &[T], &[T]) -> Vec<T> + 'a,
        fitness: impl Fn(&[T]) -> f64 + 'a,
        rng: &'a mut R,
    ) -> Result<Self, EvolutionError> {
        if initial.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        Ok(Self {
            mutator: Box::new(mutator),
            breeder: Box::new(breeder),
            fitness: Box::new(fitness),
            initial,
            rng,
        })
    }

    /// Evolves the initial population for `generations` steps and returns the fittest gene.
    pub fn run(&mut self, generations: usize) -> Scored<T> {
        self.run_observed(generations, |_| {})
    }

    /// Like [`GeneticAlgorithm::run`], showing `observer` the ranked
    /// population before every step.
    pub fn run_observed(
        &mut self,
        generations: usize,
        mut observer: impl FnMut(&Generation<'_, T>),
    ) -> Scored<T> {
        let mut population: Vec<Scored<T>> =
            self.initial.iter().map(|gene| self.score(gene.clone())).collect();

        for index in 0..generations {
            sort_by_fitness(&mut population);
            tracing::debug!(generation = index, best = population[0].fitness, "population ranked");
            tracing::trace!(
                generation = index,
                scores = ?population.iter().map(|scored| scored.fitness).collect::<Vec<_>>(),
                "generation scores"
            );
            observer(&Generation { index, population: &population });
            self.step(&mut population);
        }

        sort_by_fitness(&mut population);
        population.swap_remove(0)
    }

    fn step(&mut self, population: &mut [Scored<T>]) {
        for slot in 2..population.len() {
            let child = (self.breeder)(&mut *self.rng, &population[0].gene, &population[1].gene);
            let mutated = (self.mutator)(&mut *self.rng, child);
            population[slot] = self.score(mutated);
        }
    }

    fn score(&self, gene: Vec<T>) -> Scored<T> {
        let fitness = (self.fitness)(&gene);
        Scored { gene, fitness }
    }
}

// Stable, so equally fit genes keep their relative order.
fn sort_by_fitness<T>(population: &mut [Scored<T>]) {
    population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crossover {
    #[default]
    Uniform,
    OnePoint,
}

impl Crossover {
    pub fn breed<T: Clone, R: Rng + ?Sized>(
        self,
        rng: &mut R,
        first: &[T],
        second: &[T],
    ) -> Vec<T> {
        match self {
            Crossover::Uniform => uniform_crossover(rng, first, second),
            Crossover::OnePoint => one_point_crossover(rng, first, second),
        }
    }
}

fn longer_first<'g, T>(first: &'g [T], second: &'g [T]) -> (&'g [T], &'g [T]) {
    if first.len() < second.len() { (second, first) } else { (first, second) }
}

/// Aligned slots pick either parent's allele; surplus slots of the longer
/// parent survive with even odds, so genes of unequal length can shrink.
pub fn uniform_crossover<T: Clone, R: Rng + ?Sized>(
    rng: &mut R,
    first: &[T],
    second: &[T],
) -> Vec<T> {
    let (longer, shorter) = longer_first(first, second);
    let mut child = Vec::with_capacity(longer.len());
    for (long_allele, short_allele) in longer.iter().zip(shorter) {
        child.push(if random::coin(rng) { long_allele.clone() } else { short_allele.clone() });
    }
    for surplus in &longer[shorter.len()..] {
        if random::coin(rng) {
            child.push(surplus.clone());
        }
    }
    child
}

/// Shorter parent's prefix up to a uniform split point, then the longer
/// parent's suffix; the child always has the longer parent's length.
pub fn one_point_crossover<T: Clone, R: Rng + ?Sized>(
    rng: &mut R,
    first: &[T],
    second: &[T],
) -> Vec<T> {
    let (longer, shorter) = longer_first(first, second);
    let split = random::below(rng, shorter.len() + 1);
    shorter[..split].iter().chain(&longer[split..]).cloned().collect()
}
