/*!

This is the long-form manual for `lucky_draw` and `luckydraw`.

## Input format

The participants are read from a delimited text file (CSV by default). The first row is
a header. It must contain a column for the participant number and a column for the
participant name. Headers are compared after removing the surrounding whitespace
and ignoring the case. By default the accepted headers are `number` (or `번호`) and `name`
(or `이름`). Other columns are ignored.

```text
number,name,email
1,Alice,alice@example.com
2,Bob,
3,  Carol  ,carol@example.com
```

Each data row is cleaned as follows:
- the start of the number field is read as an integer: `12`, ` 12` and `12abc` are all
  read as `12`, `3.7` is read as `3`. A row whose number field does not start with an
  integer is dropped.
- the name is trimmed. A row with an empty name is dropped.

Dropped rows are not errors. They are logged as warnings and listed in the
`rejectedRows` section of the summary.

The whole file is refused if:
- the number or the name column is missing,
- the file is not valid delimited text (for example, a row has more fields than the
  header),
- the same number appears twice among the rows that were kept. In this case, no
  participant is retained at all.

Empty lines are skipped.

## Drawing winners

Winners are drawn uniformly at random, without replacement: every participant has the
same chance to be selected, and the order of the winners does not depend on the order of
the file. The draw is refused if there are no participants, if fewer than one winner is
requested or if more winners are requested than there are participants.

To make the draw suspenseful, the winners are only revealed after a short delay
(3 seconds by default). Pressing `Ctrl-C` during this delay cancels the draw.

A draw can be reproduced by passing the same `--seed`. Without a seed, the draw is
different every time.

```bash
luckydraw -i participants.csv --winners 3
```

```text
[2024-12-24T18:00:00Z INFO  lucky_draw] Read 3 participants
[2024-12-24T18:00:00Z INFO  lucky_draw::session] Starting a draw of 3 winners among 3 participants
Winner 1: 3 - Carol
Winner 2: 1 - Alice
Winner 3: 2 - Bob
```

## Configuration

Instead of passing all the options on the command line, `luckydraw` accepts a configuration
file in JSON with the `--config` flag. Options given on the command line take precedence
over the ones in the file. All the fields are optional except `participantSource.filePath`.

```json
{
  "outputSettings": {
    "contestName": "Winter party",
    "contestDate": "2024-12-24",
    "outputDirectory": "results"
  },
  "participantSource": {
    "filePath": "participants.csv",
    "numberColumns": ["number", "ticket"],
    "nameColumns": ["name"],
    "delimiter": ","
  },
  "rules": {
    "numberOfWinners": 5,
    "suspenseMillis": 3000,
    "randomSeed": "42"
  }
}
```

- `filePath` is relative to the directory of the configuration file.
- `delimiter` must be a single character. When it is not given, files ending in `.tsv` are
  read with tabs and all the other files with commas.
- `randomSeed` may be a number or a string containing a number.
- when `outputDirectory` is set, the summary is written to `summary.json` in that
  directory, unless `--out` is given.

## Output

With `--out <path>` (or `--out stdout`), a summary is written in JSON:

```json
{
  "config": {
    "contest": "Winter party",
    "date": "2024-12-24",
    "source": "participants.csv",
    "participants": 3,
    "requestedWinners": 2,
    "seed": 42
  },
  "results": [
    { "rank": 1, "number": 3, "name": "Carol" },
    { "rank": 2, "number": 1, "name": "Alice" }
  ],
  "rejectedRows": []
}
```

With `--reference <path>`, the summary is compared with a previously saved summary. This is
only meaningful with a fixed seed. Any difference is printed and the program fails.

 */
