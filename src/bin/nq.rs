fn main()
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = nq::run_from_env()
    {
        eprintln!("nq: {err}");
        std::process::exit(1);
    }
}
