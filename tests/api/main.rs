mod neighbor;
mod operators;
mod tree;
