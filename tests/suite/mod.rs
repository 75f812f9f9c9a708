mod persistence;
mod runner;
mod scheduler;
mod training;
