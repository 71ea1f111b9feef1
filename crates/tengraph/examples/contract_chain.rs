//! Optimize a tensor-network contraction, submit it to the DAG, and drive
//! the execution state like a graph executor would.
//!
//! Run with: cargo run --example contract_chain

use tengraph::prelude::*;

fn main() -> anyhow::Result<()> {
    // A five-tensor matrix chain with skewed extents: contraction order
    // matters a lot here.
    let network = TensorNetwork::from_subscripts(
        "ab,bc,cd,de,ef->af",
        &[
            vec![2, 64],
            vec![64, 8],
            vec![8, 64],
            vec![64, 4],
            vec![4, 16],
        ],
    )?;

    // Compare the optimizers on the same network
    for name in ["dummy", "greed", "heuro", "metis"] {
        let optimizer = create_optimizer(name)?;
        let mut next_id = network.num_inputs() as u32;
        let plan = optimizer.determine_contraction_sequence(&network, &mut || {
            next_id += 1;
            next_id
        })?;
        println!("{:>5}: {:>12.0} flops, {} steps", name, plan.flops, plan.sequence.len());
        for triple in &plan.sequence {
            print!("  {{{},{}->{}}}", triple.left_id, triple.right_id, triple.result_id);
        }
        println!();
    }

    // Submit the best sequence and walk the DAG to completion
    let graph = TensorGraph::new();
    let submitted = submit_network(&graph, &network, "heuro", ElementType::F64)?;
    println!("\nsubmitted {} operations:", submitted.len());
    print!("{}", graph.dump());

    let mut wave = 0;
    loop {
        let ready = graph.frontier();
        if ready.is_empty() {
            break;
        }
        println!("wave {}: executing {:?}", wave, ready);
        for vertex in ready {
            graph.mark_executing(vertex)?;
            graph.mark_completed(vertex)?;
        }
        wave += 1;
    }

    println!("all {} operations completed", graph.num_nodes());
    Ok(())
}
