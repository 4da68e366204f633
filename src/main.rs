#![allow(non_snake_case)]
use RustedDTM::Examples::dtm_examples::dtm_examples;

fn main() {
    let example = 0;
    dtm_examples(example);
}
