fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(".generated")?;
    tonic_prost_build::configure()
        .out_dir(".generated")
        .compile_protos(&["proto/mapreduce.proto"], &["proto"])?;
    println!("cargo:rerun-if-changed=proto/mapreduce.proto");
    Ok(())
}
