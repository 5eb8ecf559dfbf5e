use ia_exam_cli::run;

fn main() {
    if let Err(err) = run() {
        if err.is_refusal() {
            eprintln!("{err}");
            std::process::exit(2);
        }
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}
